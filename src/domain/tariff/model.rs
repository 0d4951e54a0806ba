//! Tariff domain entity

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::WeeklySchedule;
use super::tiered::TierSchedule;
use crate::domain::error::{TariffError, TariffResult};

/// Pricing strategy of a tariff ("Logica Tarifa" in the parking API)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffKind {
    /// Linear billing per hour, day or month ("sencilla")
    Flat,
    /// Step pricing by total duration with overflow blocks ("escalonado")
    Tiered,
    /// Day-of-week, time-of-day priced blocks ("por horario")
    Scheduled,
}

impl TariffKind {
    /// Label used by the parking API for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flat => "sencilla",
            Self::Tiered => "escalonado",
            Self::Scheduled => "por horario",
        }
    }

    /// Parse an API label, ignoring case and surrounding whitespace.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sencilla" => Some(Self::Flat),
            "escalonado" => Some(Self::Tiered),
            "por horario" => Some(Self::Scheduled),
            _ => None,
        }
    }
}

impl fmt::Display for TariffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Billing unit of a flat tariff ("Frecuencia")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    PerHour,
    PerDay,
    /// Calendar months, anchored on the entry date
    PerMonth,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PerHour => "por hora",
            Self::PerDay => "por día",
            Self::PerMonth => "por mes",
        }
    }

    /// Parse an API label. The unaccented "por dia" is accepted as well.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "por hora" => Some(Self::PerHour),
            "por día" | "por dia" => Some(Self::PerDay),
            "por mes" => Some(Self::PerMonth),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tariff as delivered by the reservations API, before decoding.
///
/// Field names follow the API; snake_case aliases are accepted for
/// hand-written fixtures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TariffRecord {
    #[serde(rename = "Logica Tarifa", alias = "kind", default)]
    pub kind: Option<String>,
    #[serde(rename = "Frecuencia", alias = "frequency", default)]
    pub frequency: Option<String>,
    #[serde(rename = "Tarifa", alias = "base_price", default)]
    pub base_price: Option<Decimal>,
    /// Kind-specific JSON document, embedded as text
    #[serde(rename = "TarifaJSON", alias = "payload", default)]
    pub payload: Option<String>,
}

impl TariffRecord {
    pub fn flat(frequency: &str, base_price: Decimal) -> Self {
        Self {
            kind: Some(TariffKind::Flat.label().to_string()),
            frequency: Some(frequency.to_string()),
            base_price: Some(base_price),
            payload: None,
        }
    }

    pub fn with_payload(kind: TariffKind, payload: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.label().to_string()),
            frequency: None,
            base_price: None,
            payload: Some(payload.into()),
        }
    }
}

/// Flat per-unit rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlatRate {
    pub frequency: Frequency,
    pub base_price: Decimal,
}

/// A decoded, billable tariff.
///
/// Each variant carries only what its calculator reads; the record fields a
/// kind does not use are dropped here without validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Tariff {
    Flat(FlatRate),
    Tiered(TierSchedule),
    Scheduled(WeeklySchedule),
}

impl Tariff {
    /// Decode a raw record, parsing the embedded payload eagerly.
    pub fn from_record(record: &TariffRecord) -> TariffResult<Self> {
        let label = record.kind.as_deref().ok_or(TariffError::MissingKind)?;
        let kind =
            TariffKind::from_label(label).ok_or_else(|| TariffError::UnknownKind(label.to_string()))?;

        match kind {
            TariffKind::Flat => {
                let base_price = record.base_price.ok_or(TariffError::MissingField {
                    kind: kind.label(),
                    field: "Tarifa",
                })?;
                let label = record.frequency.as_deref().ok_or(TariffError::MissingField {
                    kind: kind.label(),
                    field: "Frecuencia",
                })?;
                let frequency = Frequency::from_label(label)
                    .ok_or_else(|| TariffError::UnknownFrequency(label.to_string()))?;
                Ok(Self::Flat(FlatRate {
                    frequency,
                    base_price,
                }))
            }
            TariffKind::Tiered => Ok(Self::Tiered(TierSchedule::from_json(payload_of(
                record, kind,
            )?)?)),
            TariffKind::Scheduled => Ok(Self::Scheduled(WeeklySchedule::from_json(
                payload_of(record, kind)?,
            )?)),
        }
    }

    pub fn kind(&self) -> TariffKind {
        match self {
            Self::Flat(_) => TariffKind::Flat,
            Self::Tiered(_) => TariffKind::Tiered,
            Self::Scheduled(_) => TariffKind::Scheduled,
        }
    }
}

fn payload_of(record: &TariffRecord, kind: TariffKind) -> TariffResult<&str> {
    match record.payload.as_deref() {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(TariffError::MissingField {
            kind: kind.label(),
            field: "TarifaJSON",
        }),
    }
}

// ── Tests ──────────────────────────────────────────────────────
