//! Typed identity record persisted after user confirmation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::{FieldMapping, FieldName, FieldValue};
use crate::reconcile::parse_date;
use crate::{Error, Result};

/// Strings accepted as a positive signature flag
const SIGNATURE_TRUE_VALUES: [&str; 3] = ["true", "True", "yes"];

/// Confirmed identity card row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub issuing_country: Option<String>,
    pub authority: Option<String>,
    pub card_type: Option<String>,
    pub full_name: Option<String>,
    pub surname: Option<String>,
    pub sex: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i64>,
    pub nationality: Option<String>,
    pub id_number: Option<String>,
    pub issuing_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub signature_present: bool,
}

impl IdentityRecord {
    /// Build the typed row from a user-confirmed submission
    ///
    /// Unparseable dates are stored as null. An age that is not a whole
    /// number is rejected.
    pub fn from_submission(submission: &FieldMapping) -> Result<Self> {
        let text = |field| submission.value(field).map(|v: &FieldValue| v.to_string());
        let date = |field| {
            submission
                .value(field)
                .and_then(|v: &FieldValue| parse_date(&v.to_string()))
        };

        Ok(Self {
            issuing_country: text(FieldName::IssuingCountry),
            authority: text(FieldName::Authority),
            card_type: text(FieldName::CardType),
            full_name: text(FieldName::FullName),
            surname: text(FieldName::Surname),
            sex: text(FieldName::Sex),
            date_of_birth: date(FieldName::DateOfBirth),
            age: parse_age(submission.value(FieldName::Age))?,
            nationality: text(FieldName::Nationality),
            id_number: text(FieldName::IdNumber),
            issuing_date: date(FieldName::IssuingDate),
            expiry_date: date(FieldName::ExpiryDate),
            signature_present: signature_flag(submission.value(FieldName::SignaturePresent)),
        })
    }
}

fn parse_age(value: Option<&FieldValue>) -> Result<Option<i64>> {
    match value {
        None => Ok(None),
        Some(FieldValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(Some)
            .ok_or_else(|| Error::invalid_field(FieldName::Age, format!("{} is out of range", n))),
        Some(FieldValue::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(FieldValue::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| {
                Error::invalid_field(FieldName::Age, format!("'{}' is not a whole number", s))
            }),
        Some(FieldValue::Bool(b)) => Err(Error::invalid_field(
            FieldName::Age,
            format!("expected a number, got boolean {}", b),
        )),
    }
}

/// Boolean `true`, a listed string, or the number 1
fn signature_flag(value: Option<&FieldValue>) -> bool {
    match value {
        Some(FieldValue::Bool(b)) => *b,
        Some(FieldValue::Text(s)) => SIGNATURE_TRUE_VALUES.contains(&s.as_str()),
        Some(FieldValue::Number(n)) => n.as_f64() == Some(1.0),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(value: serde_json::Value) -> FieldMapping {
        FieldMapping::from_json(value).unwrap()
    }

    #[test]
    fn test_full_submission() {
        let record = IdentityRecord::from_submission(&submission(json!({
            "issuing_country": "Ireland",
            "authority": "DFA",
            "card_type": "Passport Card",
            "full_name": "Jane Roe",
            "surname": "Roe",
            "sex": "F",
            "date_of_birth": "14/07/1989",
            "age": "35",
            "nationality": "Irish",
            "id_number": "PC1234567",
            "issuing_date": "2020-03-01",
            "expiry_date": "01-03-2030",
            "signature_present": "yes"
        })))
        .unwrap();

        assert_eq!(record.full_name.as_deref(), Some("Jane Roe"));
        assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(1989, 7, 14));
        assert_eq!(record.issuing_date, NaiveDate::from_ymd_opt(2020, 3, 1));
        assert_eq!(record.expiry_date, NaiveDate::from_ymd_opt(2030, 3, 1));
        assert_eq!(record.age, Some(35));
        assert!(record.signature_present);
    }

    #[test]
    fn test_empty_submission_is_all_null() {
        let record = IdentityRecord::from_submission(&FieldMapping::new()).unwrap();
        assert_eq!(record, IdentityRecord::default());
    }

    #[test]
    fn test_unparseable_date_becomes_null() {
        let record =
            IdentityRecord::from_submission(&submission(json!({"expiry_date": "next year"})))
                .unwrap();
        assert_eq!(record.expiry_date, None);
    }

    #[test]
    fn test_age_variants() {
        let age = |v: serde_json::Value| {
            IdentityRecord::from_submission(&submission(json!({ "age": v })))
                .map(|r| r.age)
        };

        assert_eq!(age(json!(42)).unwrap(), Some(42));
        // Zero is a value, not a blank
        assert_eq!(age(json!(0)).unwrap(), Some(0));
        assert_eq!(age(json!("0")).unwrap(), Some(0));
        assert_eq!(age(json!(" 42 ")).unwrap(), Some(42));
        assert_eq!(age(json!("")).unwrap(), None);
        assert_eq!(age(json!(null)).unwrap(), None);
        assert!(matches!(
            age(json!("forty")),
            Err(Error::InvalidField { field: FieldName::Age, .. })
        ));
        assert!(matches!(
            age(json!(true)),
            Err(Error::InvalidField { field: FieldName::Age, .. })
        ));
    }

    #[test]
    fn test_signature_flag_values() {
        let flag = |v: serde_json::Value| {
            IdentityRecord::from_submission(&submission(json!({ "signature_present": v })))
                .unwrap()
                .signature_present
        };

        assert!(flag(json!(true)));
        assert!(flag(json!("True")));
        assert!(flag(json!("true")));
        assert!(flag(json!("yes")));
        assert!(!flag(json!("YES")));
        assert!(!flag(json!("no")));
        assert!(!flag(json!(false)));
        assert!(flag(json!(1)));
        assert!(flag(json!(1.0)));
        assert!(!flag(json!(0)));
        assert!(!flag(json!(2)));
        assert!(!flag(json!(null)));
    }
}
