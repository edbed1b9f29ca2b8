//! Candidate doctor extraction with the two-strategy fallback.

use std::time::Duration;

use crate::driver::FormDriver;
use crate::error::ScrapeError;
use crate::form::{FormFilled, DOCTOR_INPUT, DOCTOR_LIST};

/// Doctor names gathered for one job. An empty list means no doctors are
/// available and the date probe is pointless.
pub(crate) struct DoctorsExtracted {
    pub doctors: Vec<String>,
}

/// Reads candidate doctor names from the filled form.
///
/// Primary strategy: wait for the multi-option list and read all labels.
/// Only a wait-timeout falls through to the fallback, a single free-text
/// field whose non-empty value counts as exactly one doctor. Any other
/// fault aborts the job rather than reading as "no doctors".
pub(crate) async fn extract_doctors<D: FormDriver + ?Sized>(
    driver: &D,
    _form: FormFilled,
    wait: Duration,
) -> Result<DoctorsExtracted, ScrapeError> {
    match driver.wait_visible(DOCTOR_LIST, wait).await {
        Ok(()) => {
            let labels = driver.option_labels(DOCTOR_LIST).await?;
            Ok(DoctorsExtracted {
                doctors: real_names(&labels),
            })
        }
        Err(ScrapeError::Timeout { .. }) => {
            driver.wait_visible(DOCTOR_INPUT, wait).await?;
            let single = driver.input_value(DOCTOR_INPUT).await?;
            let doctors = if single.is_empty() { Vec::new() } else { vec![single] };
            Ok(DoctorsExtracted { doctors })
        }
        Err(e) => Err(e),
    }
}

/// List entries are either a "Surname, Name" pair or a placeholder
/// "not available" text; only entries carrying the comma separator are
/// real names.
pub(crate) fn real_names(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .filter(|label| label.contains(','))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::real_names;

    #[test]
    fn keeps_only_comma_separated_names() {
        let labels = vec![
            "No disponible".to_string(),
            "Doe, Jane".to_string(),
            "Smith, John".to_string(),
        ];
        assert_eq!(real_names(&labels), vec!["Doe, Jane", "Smith, John"]);
    }

    #[test]
    fn placeholder_only_list_filters_to_empty() {
        let labels = vec!["No disponible".to_string()];
        assert!(real_names(&labels).is_empty());
    }

    #[test]
    fn empty_list_stays_empty() {
        assert!(real_names(&[]).is_empty());
    }
}
