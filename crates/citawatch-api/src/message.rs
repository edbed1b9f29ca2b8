//! Notification text for availability query results.

use crate::types::AvailabilitySlot;

/// Renders the notification for one specialty's query result.
///
/// An empty slot list uses the "no appointment" template; otherwise the
/// header is followed by one line per slot, in the server's order.
#[must_use]
pub fn availability_message(specialty_id: i64, slots: &[AvailabilitySlot]) -> String {
    if slots.is_empty() {
        return format!("🔴 API: No appointment available for specialty ID: {specialty_id}");
    }

    let mut message = format!("🎉 API: Appointment available for specialty ID: {specialty_id}");
    for slot in slots {
        message.push_str(&format!(
            "\n >> {} {} {} {} {}",
            slot.date_time,
            slot.format_name,
            slot.doctor_name,
            slot.location_name,
            slot.consultation_name
        ));
    }
    message
}
