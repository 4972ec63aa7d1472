//! Transaction aggregate: entity, form draft, and validation.
//!
//! A transaction is one real-estate deal owned by a single agent. Its
//! status walks an ordered progression (`Active` → `Under Contract` →
//! `Closed`) that is not enforced as a state machine but does imply which
//! fields must be present: contract and closing details from
//! `Under Contract` onward, commission income once `Closed`.

mod list;
mod service;

pub use self::list::{filter_and_sort, format_short_date};
pub use self::service::{TransactionService, TransactionSubmitOutcome};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::validation::{parse_money, reasonable_date_window};

/// Which side of the deal the agent represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientType {
    /// The agent represents the purchasing party.
    Buyer,
    /// The agent represents the selling party.
    Seller,
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "Buyer"),
            Self::Seller => write!(f, "Seller"),
        }
    }
}

/// Lifecycle stage of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Listed or searching; no contract yet.
    Active,
    /// Offer accepted, awaiting closing.
    #[serde(rename = "Under Contract")]
    UnderContract,
    /// Deal completed.
    Closed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::UnderContract => write!(f, "Under Contract"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// One stored transaction record.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Stable record identifier.
    pub id: Uuid,
    /// Owning agent account.
    pub user_id: Uuid,
    /// Property address; may be empty for an active buyer search.
    pub address: String,
    /// Client family name used on the card.
    pub client_last_name: String,
    /// Buyer or seller representation.
    pub client_type: ClientType,
    /// Lifecycle stage.
    pub status: TransactionStatus,
    /// Date the contract was signed.
    pub under_contract_date: Option<NaiveDate>,
    /// Agreed sale price in whole dollars.
    pub sale_price: Option<f64>,
    /// Scheduled or actual closing date.
    pub closing_date: Option<NaiveDate>,
    /// Commission earned; populated once closed.
    pub gross_commission_income: Option<f64>,
    /// Public URL of an attached property photo.
    pub image_url: Option<String>,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated payload accepted by the transaction store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Owning agent account.
    pub user_id: Uuid,
    /// Property address (may be empty for an active buyer search).
    pub address: String,
    /// Client family name.
    pub client_last_name: String,
    /// Buyer or seller representation.
    pub client_type: ClientType,
    /// Lifecycle stage.
    pub status: TransactionStatus,
    /// Date the contract was signed.
    pub under_contract_date: Option<NaiveDate>,
    /// Agreed sale price.
    pub sale_price: Option<f64>,
    /// Scheduled or actual closing date.
    pub closing_date: Option<NaiveDate>,
    /// Commission earned.
    pub gross_commission_income: Option<f64>,
    /// Public URL of an attached property photo.
    pub image_url: Option<String>,
}

/// Image formats accepted for property photos.
const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Attachment size ceiling (5 MiB).
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A property photo selected in the entry form, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Original file name, used to derive the stored extension.
    pub file_name: String,
    /// MIME type reported by the picker.
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Storage extension for the uploaded object.
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => match self.content_type.as_str() {
                "image/png" => "png",
                "image/gif" => "gif",
                "image/webp" => "webp",
                _ => "jpg",
            },
        }
    }

    fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            violations
                .push("Please upload a valid image file (JPEG, PNG, GIF, or WebP)".to_owned());
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            violations.push(
                "Image file is too large. Please choose an image smaller than 5MB".to_owned(),
            );
        }
        violations
    }
}

/// Raw entry-form state for creating or editing a transaction.
///
/// Money fields arrive as display-formatted text because that is what the
/// form renders; [`TransactionDraft::validate`] parses them into a
/// [`NewTransaction`] or reports every violation at once.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// Owning agent account.
    pub user_id: Uuid,
    /// Record being edited, or `None` when creating.
    pub editing_id: Option<Uuid>,
    /// Property address field.
    pub address: String,
    /// Client family name field.
    pub client_last_name: String,
    /// Buyer or seller selection.
    pub client_type: ClientType,
    /// Status selection.
    pub status: TransactionStatus,
    /// Contract date field.
    pub under_contract_date: Option<NaiveDate>,
    /// Sale price field as typed, possibly currency formatted.
    pub sale_price: String,
    /// Closing date field.
    pub closing_date: Option<NaiveDate>,
    /// Commission field as typed, possibly currency formatted.
    pub gross_commission_income: String,
    /// Newly selected property photo, if any.
    pub attachment: Option<ImageAttachment>,
    /// Photo URL kept from a previous save when no new photo is selected.
    pub existing_image_url: Option<String>,
}

impl TransactionDraft {
    /// Parse and validate the draft against `today`.
    ///
    /// Every violation is collected; the returned error joins them into one
    /// message for inline display and carries the individual entries as
    /// structured details. The returned record has no image URL yet — the
    /// upload happens after validation and fills it in.
    pub fn validate(&self, today: NaiveDate) -> Result<NewTransaction, Error> {
        let mut violations = Vec::new();

        if self.client_last_name.trim().is_empty() {
            violations.push("Client last name is required".to_owned());
        }

        // An active buyer has no property yet, so the address may stay blank.
        let address_optional =
            self.client_type == ClientType::Buyer && self.status == TransactionStatus::Active;
        if self.address.trim().is_empty() && !address_optional {
            violations.push("Address is required".to_owned());
        }

        let stage = self.status.to_string().to_lowercase();
        if self.status != TransactionStatus::Active {
            if self.under_contract_date.is_none() {
                violations.push(format!(
                    "Under contract date is required for {stage} transactions"
                ));
            }
            if self.sale_price.trim().is_empty() {
                violations.push(format!("Sales price is required for {stage} transactions"));
            }
            if self.closing_date.is_none() {
                violations.push(format!("Closing date is required for {stage} transactions"));
            }
        }
        if self.status == TransactionStatus::Closed && self.gross_commission_income.trim().is_empty()
        {
            violations.push("Gross commission income is required for closed transactions".to_owned());
        }

        let sale_price = match parse_money(&self.sale_price) {
            Ok(value) => value,
            Err(_) => {
                violations.push("Sales price must be a valid non-negative number".to_owned());
                None
            }
        };
        let gross_commission_income = match parse_money(&self.gross_commission_income) {
            Ok(value) => value,
            Err(_) => {
                violations
                    .push("Gross commission income must be a valid non-negative number".to_owned());
                None
            }
        };

        if let (Some(contract), Some(closing)) = (self.under_contract_date, self.closing_date)
            && closing < contract
        {
            violations.push("Closing date cannot be before under contract date".to_owned());
        }

        let (earliest, latest) = reasonable_date_window(today);
        if let Some(contract) = self.under_contract_date
            && !(earliest..=latest).contains(&contract)
        {
            violations.push("Under contract date must be within a reasonable range".to_owned());
        }
        if let Some(closing) = self.closing_date
            && !(earliest..=latest).contains(&closing)
        {
            violations.push("Closing date must be within a reasonable range".to_owned());
        }

        if let Some(attachment) = &self.attachment {
            violations.extend(attachment.violations());
        }

        if !violations.is_empty() {
            return Err(Error::invalid_request(violations.join(". "))
                .with_details(json!({ "violations": violations })));
        }

        Ok(NewTransaction {
            user_id: self.user_id,
            address: self.address.trim().to_owned(),
            client_last_name: self.client_last_name.trim().to_owned(),
            client_type: self.client_type,
            status: self.status,
            under_contract_date: self.under_contract_date,
            sale_price,
            closing_date: self.closing_date,
            gross_commission_income,
            image_url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Validation coverage for transaction drafts.

    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn today() -> NaiveDate {
        date(2025, 6, 15)
    }

    fn draft(status: TransactionStatus, client_type: ClientType) -> TransactionDraft {
        TransactionDraft {
            user_id: Uuid::new_v4(),
            editing_id: None,
            address: "12 Harbour Row".to_owned(),
            client_last_name: "Nakamura".to_owned(),
            client_type,
            status,
            under_contract_date: Some(date(2025, 5, 1)),
            sale_price: "$450,000".to_owned(),
            closing_date: Some(date(2025, 7, 1)),
            gross_commission_income: "13500".to_owned(),
            attachment: None,
            existing_image_url: None,
        }
    }

    #[test]
    fn closed_seller_draft_parses_to_typed_record() {
        let record = draft(TransactionStatus::Closed, ClientType::Seller)
            .validate(today())
            .expect("draft should validate");

        assert_eq!(record.sale_price, Some(450_000.0));
        assert_eq!(record.gross_commission_income, Some(13_500.0));
        assert_eq!(record.image_url, None);
    }

    #[test]
    fn active_buyer_may_omit_address_and_deal_fields() {
        let mut input = draft(TransactionStatus::Active, ClientType::Buyer);
        input.address = String::new();
        input.under_contract_date = None;
        input.sale_price = String::new();
        input.closing_date = None;
        input.gross_commission_income = String::new();

        let record = input.validate(today()).expect("draft should validate");
        assert_eq!(record.address, "");
        assert_eq!(record.sale_price, None);
    }

    #[test]
    fn active_seller_still_requires_an_address() {
        let mut input = draft(TransactionStatus::Active, ClientType::Seller);
        input.address = "   ".to_owned();

        let err = input.validate(today()).expect_err("draft must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(err.message().contains("Address is required"));
    }

    #[rstest]
    #[case::contract_date(TransactionStatus::UnderContract, "Under contract date is required for under contract transactions")]
    #[case::commission(TransactionStatus::Closed, "Gross commission income is required for closed transactions")]
    fn stage_specific_fields_are_enforced(
        #[case] status: TransactionStatus,
        #[case] expected: &str,
    ) {
        let mut input = draft(status, ClientType::Seller);
        input.under_contract_date = None;
        input.gross_commission_income = String::new();

        let err = input.validate(today()).expect_err("draft must fail");
        assert!(
            err.message().contains(expected),
            "missing violation in: {}",
            err.message()
        );
    }

    #[test]
    fn collects_every_violation_into_one_message() {
        let mut input = draft(TransactionStatus::Closed, ClientType::Seller);
        input.client_last_name = String::new();
        input.sale_price = "lots".to_owned();

        let err = input.validate(today()).expect_err("draft must fail");
        assert!(err.message().contains("Client last name is required"));
        assert!(
            err.message()
                .contains("Sales price must be a valid non-negative number")
        );
        let details = err.details().expect("structured details");
        assert_eq!(details["violations"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn closing_before_contract_is_rejected() {
        let mut input = draft(TransactionStatus::UnderContract, ClientType::Buyer);
        input.under_contract_date = Some(date(2025, 7, 1));
        input.closing_date = Some(date(2025, 5, 1));

        let err = input.validate(today()).expect_err("draft must fail");
        assert!(
            err.message()
                .contains("Closing date cannot be before under contract date")
        );
    }

    #[rstest]
    #[case::too_old(date(2019, 12, 31))]
    #[case::too_far(date(2028, 1, 1))]
    fn dates_outside_the_sane_window_are_rejected(#[case] closing: NaiveDate) {
        let mut input = draft(TransactionStatus::UnderContract, ClientType::Buyer);
        input.under_contract_date = Some(date(2019, 1, 1).max(closing.pred_opt().unwrap_or(closing)));
        input.closing_date = Some(closing);

        let err = input.validate(today()).expect_err("draft must fail");
        assert!(
            err.message().contains("must be within a reasonable range"),
            "missing violation in: {}",
            err.message()
        );
    }

    #[rstest]
    #[case::wrong_type("floorplan.pdf", "application/pdf", 1024, "valid image file")]
    #[case::oversized("house.png", "image/png", MAX_IMAGE_BYTES + 1, "too large")]
    fn attachment_rules_are_enforced(
        #[case] file_name: &str,
        #[case] content_type: &str,
        #[case] size: usize,
        #[case] expected: &str,
    ) {
        let mut input = draft(TransactionStatus::Closed, ClientType::Seller);
        input.attachment = Some(ImageAttachment {
            file_name: file_name.to_owned(),
            content_type: content_type.to_owned(),
            bytes: vec![0; size],
        });

        let err = input.validate(today()).expect_err("draft must fail");
        assert!(
            err.message().contains(expected),
            "missing violation in: {}",
            err.message()
        );
    }

    #[rstest]
    #[case::from_name("garden.webp", "image/jpeg", "webp")]
    #[case::from_content_type("photo", "image/png", "png")]
    #[case::fallback("photo", "image/jpeg", "jpg")]
    fn attachment_extension_prefers_the_file_name(
        #[case] file_name: &str,
        #[case] content_type: &str,
        #[case] expected: &str,
    ) {
        let attachment = ImageAttachment {
            file_name: file_name.to_owned(),
            content_type: content_type.to_owned(),
            bytes: Vec::new(),
        };
        assert_eq!(attachment.extension(), expected);
    }
}
