//! Report data model: one observation session and the targets seen in it.

use serde::Serialize;

/// Header fields recognised in a report block, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HeaderField {
    Date,
    Time,
    Location,
    Altitude,
    Temperature,
    Seeing,
    Transparency,
    Darkness,
    Telescopes,
    Eyepieces,
    Filters,
}

impl HeaderField {
    pub const ALL: [HeaderField; 11] = [
        HeaderField::Date,
        HeaderField::Time,
        HeaderField::Location,
        HeaderField::Altitude,
        HeaderField::Temperature,
        HeaderField::Seeing,
        HeaderField::Transparency,
        HeaderField::Darkness,
        HeaderField::Telescopes,
        HeaderField::Eyepieces,
        HeaderField::Filters,
    ];

    /// Key as written in the raw report files.
    pub fn label(self) -> &'static str {
        match self {
            HeaderField::Date => "Date",
            HeaderField::Time => "Time",
            HeaderField::Location => "Location",
            HeaderField::Altitude => "Altitude",
            HeaderField::Temperature => "Temperature",
            HeaderField::Seeing => "Seeing",
            HeaderField::Transparency => "Transparency",
            HeaderField::Darkness => "Darkness",
            HeaderField::Telescopes => "Telescopes",
            HeaderField::Eyepieces => "Eyepieces",
            HeaderField::Filters => "Filters",
        }
    }

    /// Case-insensitive lookup of a raw key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(key))
    }
}

/// Columns of the target table, in the order the marker row lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetColumn {
    Target,
    Constellation,
    Type,
    Power,
    Notes,
}

impl TargetColumn {
    pub const ALL: [TargetColumn; 5] = [
        TargetColumn::Target,
        TargetColumn::Constellation,
        TargetColumn::Type,
        TargetColumn::Power,
        TargetColumn::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TargetColumn::Target => "Target",
            TargetColumn::Constellation => "Cons",
            TargetColumn::Type => "Type",
            TargetColumn::Power => "Power",
            TargetColumn::Notes => "Notes",
        }
    }

    /// True when the first five fields spell out the marker row.
    pub fn is_marker_row(fields: &[String]) -> bool {
        fields.len() >= Self::ALL.len()
            && Self::ALL
                .iter()
                .zip(fields)
                .all(|(col, field)| col.label().eq_ignore_ascii_case(field))
    }
}

/// Session metadata. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportHeader {
    pub date: String,
    pub time: String,
    pub location: String,
    pub altitude: String,
    pub temperature: String,
    pub seeing: String,
    pub transparency: String,
    pub darkness: String,
    pub telescopes: String,
    pub eyepieces: String,
    pub filters: String,
}

impl ReportHeader {
    pub fn get(&self, field: HeaderField) -> &str {
        match field {
            HeaderField::Date => &self.date,
            HeaderField::Time => &self.time,
            HeaderField::Location => &self.location,
            HeaderField::Altitude => &self.altitude,
            HeaderField::Temperature => &self.temperature,
            HeaderField::Seeing => &self.seeing,
            HeaderField::Transparency => &self.transparency,
            HeaderField::Darkness => &self.darkness,
            HeaderField::Telescopes => &self.telescopes,
            HeaderField::Eyepieces => &self.eyepieces,
            HeaderField::Filters => &self.filters,
        }
    }

    pub fn set(&mut self, field: HeaderField, value: impl Into<String>) {
        let slot = match field {
            HeaderField::Date => &mut self.date,
            HeaderField::Time => &mut self.time,
            HeaderField::Location => &mut self.location,
            HeaderField::Altitude => &mut self.altitude,
            HeaderField::Temperature => &mut self.temperature,
            HeaderField::Seeing => &mut self.seeing,
            HeaderField::Transparency => &mut self.transparency,
            HeaderField::Darkness => &mut self.darkness,
            HeaderField::Telescopes => &mut self.telescopes,
            HeaderField::Eyepieces => &mut self.eyepieces,
            HeaderField::Filters => &mut self.filters,
        };
        *slot = value.into();
    }

    /// Non-empty fields paired with their labels, in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (HeaderField, &str)> {
        HeaderField::ALL
            .into_iter()
            .map(|f| (f, self.get(f)))
            .filter(|(_, v)| !v.is_empty())
    }
}

/// One observed object within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetEntry {
    pub target: String,
    pub constellation: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub power: String,
    pub notes: String,
}

impl TargetEntry {
    /// Build from a table row. The row must hold at least five fields;
    /// anything past the fifth is ignored.
    pub fn from_row(fields: &[String]) -> Option<Self> {
        match fields {
            [target, constellation, kind, power, notes, ..] => Some(Self {
                target: target.clone(),
                constellation: constellation.clone(),
                kind: kind.clone(),
                power: power.clone(),
                notes: escape_notes(notes),
            }),
            _ => None,
        }
    }

    /// Planets, the Sun and the Moon.
    pub fn is_solar_body(&self) -> bool {
        self.kind.eq_ignore_ascii_case("planet")
            || self.target.eq_ignore_ascii_case("moon")
            || self.target.eq_ignore_ascii_case("sun")
    }

    /// Asteroids and comets share one unit per type.
    pub fn is_minor_body(&self) -> bool {
        self.kind.eq_ignore_ascii_case("asteroid") || self.kind.eq_ignore_ascii_case("comet")
    }

    /// Single, double and multiple stars.
    pub fn is_star(&self) -> bool {
        ["star", "dbl star", "mlt star"]
            .iter()
            .any(|k| self.kind.eq_ignore_ascii_case(k))
    }

    pub fn is_milky_way(&self) -> bool {
        self.kind.eq_ignore_ascii_case("galaxy") && self.target.eq_ignore_ascii_case("milky way")
    }
}

/// Notes are consumed by literal-text renderers: percent signs are escaped
/// and ampersands spelled out.
fn escape_notes(notes: &str) -> String {
    notes.replace('%', "\\%").replace('&', " and ")
}

/// One parsed observation session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub header: ReportHeader,
    pub entries: Vec<TargetEntry>,
}

impl Report {
    pub fn date(&self) -> &str {
        &self.header.date
    }
}
