//! Card checks for the simulated checkout. Only the predicate lives here;
//! nothing is charged.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::report::{Field, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    AmericanExpress,
    Discover,
}

impl CardBrand {
    pub fn cvv_len(&self) -> usize {
        match self {
            CardBrand::AmericanExpress => 4,
            _ => 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardForm {
    #[serde(default)]
    pub holder: String,
    #[serde(default)]
    pub number: String,
    /// `MM/YY`
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub cvv: String,
}

fn brand_patterns() -> &'static [(CardBrand, Regex)] {
    static PATTERNS: OnceLock<Vec<(CardBrand, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (CardBrand::Visa, r"^4(\d{12}|\d{15}|\d{18})$"),
            (
                CardBrand::Mastercard,
                r"^(5[1-5]\d{14}|2(22[1-9]|2[3-9]\d|[3-6]\d{2}|7[01]\d|720)\d{12})$",
            ),
            (CardBrand::AmericanExpress, r"^3[47]\d{13}$"),
            (CardBrand::Discover, r"^6(011\d{12}|5\d{14}|4[4-9]\d{13})$"),
        ]
        .into_iter()
        .map(|(brand, pattern)| (brand, Regex::new(pattern).expect("card pattern compiles")))
        .collect()
    })
}

/// Strips spaces and dashes. Returns `None` if anything but digits remains.
fn card_digits(number: &str) -> Option<String> {
    let digits: String = number.chars().filter(|c| *c != ' ' && *c != '-').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

/// Luhn checksum over a 12 to 19 digit card number
pub fn luhn_valid(number: &str) -> bool {
    let Some(digits) = card_digits(number) else {
        return false;
    };
    if !(12..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

pub fn detect_brand(number: &str) -> Option<CardBrand> {
    let digits = card_digits(number)?;
    brand_patterns()
        .iter()
        .find(|(_, pattern)| pattern.is_match(&digits))
        .map(|(brand, _)| *brand)
}

/// Parses `MM/YY` into (year, month)
fn parse_expiry(expiry: &str) -> Option<(i32, u32)> {
    let (month, year) = expiry.trim().split_once('/')?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(month) || !two_digits(year) {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((2000 + year, month))
}

/// Validates the checkout form. A card stays valid through its expiry month.
pub fn validate_card(form: &CardForm, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::new();

    if form.holder.trim().is_empty() {
        report.insert(Field::CardHolder, "Card holder name is required");
    }

    let brand = detect_brand(&form.number);
    if form.number.trim().is_empty() {
        report.insert(Field::CardNumber, "Card number is required");
    } else if !luhn_valid(&form.number) {
        report.insert(Field::CardNumber, "Card number is invalid");
    } else if brand.is_none() {
        report.insert(Field::CardNumber, "Card type is not supported");
    }

    match parse_expiry(&form.expiry) {
        None => report.insert(Field::Expiry, "Expiry must be in MM/YY format"),
        Some(expiry) if expiry < (today.year(), today.month()) => {
            report.insert(Field::Expiry, "Card has expired")
        }
        Some(_) => {}
    }

    let cvv = form.cvv.trim();
    let cvv_ok = cvv.bytes().all(|b| b.is_ascii_digit())
        && match brand {
            Some(brand) => cvv.len() == brand.cvv_len(),
            None => cvv.len() == 3 || cvv.len() == 4,
        };
    if !cvv_ok {
        report.insert(Field::Cvv, "Security code is invalid");
    }

    report
}
