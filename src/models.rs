use crate::catalog::{CakeField, CakeSize};
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryWindow {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOrder {
    #[serde(rename = "property_cliente", default)]
    pub client: Option<String>,
    #[serde(rename = "property_data_entrega", default)]
    pub delivery: Option<DeliveryWindow>,
    #[serde(rename = "property_bolo_pdm_g", default, deserialize_with = "quantity")]
    pub pdm_large: Option<i64>,
    #[serde(rename = "property_bolo_pdm_p", default, deserialize_with = "quantity")]
    pub pdm_small: Option<i64>,
    #[serde(
        rename = "property_bolo_de_mel_g_com_calda",
        default,
        deserialize_with = "quantity"
    )]
    pub honey_large_with_syrup: Option<i64>,
    #[serde(rename = "property_bolo_choco_g", default, deserialize_with = "quantity")]
    pub chocolate_large: Option<i64>,
    #[serde(rename = "property_bolo_choco_p", default, deserialize_with = "quantity")]
    pub chocolate_small: Option<i64>,
}

impl RawOrder {
    pub fn client(&self) -> Option<&str> {
        self.client.as_deref().filter(|name| !name.is_empty())
    }

    pub fn delivery_start(&self) -> Option<&str> {
        self.delivery
            .as_ref()
            .and_then(|window| window.start.as_deref())
            .filter(|start| !start.is_empty())
    }

    pub fn quantity(&self, field: CakeField) -> Option<i64> {
        match field {
            CakeField::PdmLarge => self.pdm_large,
            CakeField::PdmSmall => self.pdm_small,
            CakeField::HoneyLargeWithSyrup => self.honey_large_with_syrup,
            CakeField::ChocolateLarge => self.chocolate_large,
            CakeField::ChocolateSmall => self.chocolate_small,
        }
    }
}

// Accepts integers and whole floats (`2.0`); anything else fails the record.
fn quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(value) = number.as_i64() {
        return Ok(Some(value));
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            Ok(Some(value as i64))
        }
        _ => Err(D::Error::custom(format!(
            "quantity {number} is not a whole number"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekDay {
    pub const ALL: [WeekDay; 6] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
    ];

    pub fn from_sunday_index(index: u32) -> Option<WeekDay> {
        match index {
            1..=6 => Some(Self::ALL[index as usize - 1]),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WeekDay::Monday => "Segunda-feira",
            WeekDay::Tuesday => "Terça-feira",
            WeekDay::Wednesday => "Quarta-feira",
            WeekDay::Thursday => "Quinta-feira",
            WeekDay::Friday => "Sexta-feira",
            WeekDay::Saturday => "Sábado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CakeLineItem {
    pub base_type: &'static str,
    pub quantity: u64,
    pub abbreviation: &'static str,
    pub color: &'static str,
    pub size: CakeSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedOrder {
    pub client: String,
    pub line_items: Vec<CakeLineItem>,
    pub original_delivery: String,
    pub formatted_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummaryEntry {
    pub base_type: &'static str,
    pub abbreviation: &'static str,
    pub color: &'static str,
    pub small_count: u64,
    pub large_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekBucket {
    pub orders: Vec<ProcessedOrder>,
    pub summary: Vec<DaySummaryEntry>,
    pub display_date: String,
    pub is_past: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekBoard {
    pub week_number: u32,
    pub generated_at: DateTime<Utc>,
    pub buckets: BTreeMap<WeekDay, WeekBucket>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BoardView {
    pub board: Option<WeekBoard>,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub refreshing: bool,
    pub auto_refresh: bool,
}

#[derive(Debug, Deserialize)]
pub struct AutoRefreshRequest {
    pub enabled: bool,
}
