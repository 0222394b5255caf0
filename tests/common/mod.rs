//! Shared DocumentData, Documents and templates for integration tests

#![allow(dead_code)]

use barber::{Document, DocumentData, DocumentTemplate, Locale, SourceType, TargetType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct RecipientReceipt {
    pub sender: String,
    pub amount: String,
    pub cancel_url: String,
    pub deposit_expected_at: String,
}

impl DocumentData for RecipientReceipt {
    fn source_type() -> SourceType {
        SourceType::new("RecipientReceipt")
            .field("sender")
            .field("amount")
            .field("cancel_url")
            .field("deposit_expected_at")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SenderReceipt {
    pub recipient: String,
    pub amount: String,
    pub cancel_url: String,
    pub deposit_expected_at: String,
}

impl DocumentData for SenderReceipt {
    fn source_type() -> SourceType {
        SourceType::new("SenderReceipt")
            .field("recipient")
            .field("amount")
            .field("cancel_url")
            .field("deposit_expected_at")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Button {
    pub color: String,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ButtonDocumentData {
    pub button: Button,
}

impl DocumentData for ButtonDocumentData {
    fn source_type() -> SourceType {
        SourceType::new("ButtonDocumentData").field("button")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionalSmsDocument {
    pub sms_body: String,
}

impl Document for TransactionalSmsDocument {
    fn target_type() -> TargetType {
        TargetType::new("TransactionalSmsDocument").field("sms_body")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionalEmailDocument {
    pub subject: String,
    pub headline: String,
    pub short_description: String,
    pub primary_button: String,
    pub primary_button_url: String,
    pub secondary_button: Option<String>,
    pub secondary_button_url: Option<String>,
}

impl Document for TransactionalEmailDocument {
    fn target_type() -> TargetType {
        TargetType::new("TransactionalEmailDocument")
            .field("subject")
            .field("headline")
            .field("short_description")
            .field("primary_button")
            .field("primary_button_url")
            .nullable_field("secondary_button")
            .nullable_field("secondary_button_url")
    }
}

pub fn locale(tag: &str) -> Locale {
    Locale::parse(tag).unwrap()
}

pub fn recipient_receipt() -> RecipientReceipt {
    RecipientReceipt {
        sender: "Tom".to_string(),
        amount: "$50".to_string(),
        cancel_url: "https://cash.app/cancel/123".to_string(),
        deposit_expected_at: "Monday".to_string(),
    }
}

fn recipient_sms(locale_tag: &str, body: &str) -> DocumentTemplate {
    DocumentTemplate::new(RecipientReceipt::source_type(), locale(locale_tag))
        .field("sms_body", body)
        .target_document::<TransactionalSmsDocument>()
}

pub fn recipient_receipt_sms_en_us() -> DocumentTemplate {
    recipient_sms(
        "en-US",
        "{{sender}} sent you {{amount}}. It will be available at {{deposit_expected_at}}. Cancel here: {{cancel_url}}",
    )
}

pub fn recipient_receipt_sms_en_ca() -> DocumentTemplate {
    recipient_sms(
        "en-CA",
        "{{sender}} sent you {{amount}}, eh? It will be available at {{deposit_expected_at}}. Cancel here: {{cancel_url}}",
    )
}

pub fn recipient_receipt_sms_en_gb() -> DocumentTemplate {
    recipient_sms(
        "en-GB",
        "{{sender}} sent you {{amount}}, mate. It will be available at {{deposit_expected_at}}. Cancel here: {{cancel_url}}",
    )
}

pub fn recipient_receipt_sms_email_en_us() -> DocumentTemplate {
    DocumentTemplate::new(RecipientReceipt::source_type(), locale("en-US"))
        .field("sms_body", "{{sender}} sent you {{amount}}")
        .field("subject", "{{sender}} sent you {{amount}}")
        .field("headline", "You received {{amount}}")
        .field("short_description", "You received {{amount}} from {{sender}}")
        .field("primary_button", "Cancel")
        .field("primary_button_url", "{{cancel_url}}")
        .blank_field("secondary_button")
        .blank_field("secondary_button_url")
        .target_document::<TransactionalSmsDocument>()
        .target_document::<TransactionalEmailDocument>()
}

pub fn sender_receipt_email_en_us() -> DocumentTemplate {
    DocumentTemplate::new(SenderReceipt::source_type(), locale("en-US"))
        .field("subject", "You sent {{amount}} to {{recipient}}")
        .field("headline", "You sent {{amount}}")
        .field("short_description", "{{recipient}} receives it {{deposit_expected_at}}")
        .field("primary_button", "Cancel")
        .field("primary_button_url", "{{cancel_url}}")
        .blank_field("secondary_button")
        .blank_field("secondary_button_url")
        .target_document::<TransactionalEmailDocument>()
}
