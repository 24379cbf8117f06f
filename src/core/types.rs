//! Domain types shared by the allocator, ledger and analytics.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::ParkingError;

/// Longest plate accepted after normalisation.
pub const MAX_PLATE_LEN: usize = 20;

/// Category of a parking spot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SpotType {
    /// Standard spot.
    #[default]
    Regular,
    /// Reserved for disabled drivers.
    Disabled,
    /// Premium spot.
    Vip,
}

impl SpotType {
    /// All spot types in allocation order.
    pub const ALL: [Self; 3] = [Self::Regular, Self::Disabled, Self::Vip];

    /// Lower-case name used in messages and storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Disabled => "disabled",
            Self::Vip => "vip",
        }
    }
}

impl fmt::Display for SpotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "disabled" => Ok(Self::Disabled),
            "vip" => Ok(Self::Vip),
            other => Err(format!("unknown spot type `{other}`")),
        }
    }
}

/// Composite spot key. Ordering is floor first, then number, which is the
/// allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpotId {
    /// Floor, starting at 1.
    pub floor: u16,
    /// Spot number on the floor, starting at 1.
    pub number: u16,
}

impl SpotId {
    /// Build a spot key.
    pub const fn new(floor: u16, number: u16) -> Self {
        Self { floor, number }
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.floor, self.number)
    }
}

impl FromStr for SpotId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (floor, number) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("spot label `{s}` is not <floor>-<number>"))?;
        let floor = floor
            .parse()
            .map_err(|e| format!("bad floor in `{s}`: {e}"))?;
        let number = number
            .parse()
            .map_err(|e| format!("bad spot number in `{s}`: {e}"))?;
        Ok(Self { floor, number })
    }
}

/// Occupancy state of a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    /// Available for allocation.
    Free,
    /// Bound to exactly one open session.
    Occupied,
}

/// A physical parking space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSpot {
    /// Composite key.
    pub id: SpotId,
    /// Spot category.
    pub spot_type: SpotType,
    /// Current occupancy.
    pub occupancy: Occupancy,
}

impl ParkingSpot {
    /// A free spot.
    pub const fn free(id: SpotId, spot_type: SpotType) -> Self {
        Self {
            id,
            spot_type,
            occupancy: Occupancy::Free,
        }
    }

    /// Whether the spot is occupied.
    pub fn is_occupied(&self) -> bool {
        self.occupancy == Occupancy::Occupied
    }
}

/// Normalised license plate: trimmed, upper-cased, non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicensePlate(String);

impl LicensePlate {
    /// Normalise and validate a raw plate.
    pub fn parse(raw: &str) -> Result<Self, ParkingError> {
        let plate = raw.trim().to_uppercase();
        if plate.is_empty() {
            return Err(ParkingError::InvalidPlate("license plate is empty".into()));
        }
        if plate.chars().count() > MAX_PLATE_LEN {
            return Err(ParkingError::InvalidPlate(format!(
                "license plate `{plate}` exceeds {MAX_PLATE_LEN} characters"
            )));
        }
        Ok(Self(plate))
    }

    /// Plate text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicensePlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LicensePlate {
    type Error = ParkingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LicensePlate> for String {
    fn from(plate: LicensePlate) -> Self {
        plate.0
    }
}

/// A vehicle as recorded at entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique key.
    pub plate: LicensePlate,
    /// Body color as reported at the gate.
    pub color: String,
    /// Manufacturer.
    pub brand: String,
}

impl Vehicle {
    /// Build a vehicle, trimming the free-text attributes.
    pub fn new(plate: LicensePlate, color: &str, brand: &str) -> Self {
        Self {
            plate,
            color: color.trim().to_string(),
            brand: brand.trim().to_string(),
        }
    }
}

/// Session identifier, assigned sequentially by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Vehicle is on site.
    Open,
    /// Vehicle left and paid. Terminal.
    Closed,
}

/// Payment state mirrored from the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet charged.
    Pending,
    /// Fee settled at exit.
    Paid,
}

/// One vehicle's stay on one spot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSession {
    /// Identifier.
    pub id: SessionId,
    /// Vehicle attributes at entry.
    pub vehicle: Vehicle,
    /// Spot held by the session.
    pub spot: SpotId,
    /// Type of the held spot.
    pub spot_type: SpotType,
    /// Entry instant.
    pub entry_time: DateTime<Utc>,
    /// Exit instant, set once on close.
    pub exit_time: Option<DateTime<Utc>>,
    /// Fee charged on close.
    pub fee: Option<Decimal>,
    /// Hourly rate in force at entry.
    pub hourly_rate: Decimal,
}

impl ParkingSession {
    /// Current lifecycle state.
    pub const fn state(&self) -> SessionState {
        if self.exit_time.is_some() {
            SessionState::Closed
        } else {
            SessionState::Open
        }
    }

    /// Whether the session is still open.
    pub const fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    /// Payment state.
    pub const fn payment_status(&self) -> PaymentStatus {
        match self.state() {
            SessionState::Open => PaymentStatus::Pending,
            SessionState::Closed => PaymentStatus::Paid,
        }
    }

    /// Length of a closed stay.
    pub fn duration(&self) -> Option<Duration> {
        self.exit_time.map(|exit| exit - self.entry_time)
    }
}

/// Inclusive time range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First instant included.
    pub start: DateTime<Utc>,
    /// Last instant included.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window; bounds are swapped when given in reverse.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// The `hours` hours leading up to `now`.
    ///
    /// Starts at the earliest representable instant when the span reaches
    /// past it.
    pub fn last_hours(hours: u32, now: DateTime<Utc>) -> Self {
        let start = Duration::try_hours(i64::from(hours))
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::new(start, now)
    }

    /// Whether `instant` lies in the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}
