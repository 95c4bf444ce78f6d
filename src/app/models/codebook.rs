//! Code dictionaries for presenting stored survey answers
//!
//! The load path never consults this module. Stored rows keep the raw codes
//! published in the spreadsheets; this is the keyed lookup used when those
//! codes are shown to a person.

use super::{CanonicalField, Cell};
use std::collections::{BTreeMap, HashMap};

/// Reserved answer codes that stand in for a missing measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    DontKnow,
    Declined,
    DontRecall,
}

impl Sentinel {
    pub fn label(self) -> &'static str {
        match self {
            Sentinel::DontKnow => "não sabe",
            Sentinel::Declined => "não quis informar",
            Sentinel::DontRecall => "não lembra",
        }
    }
}

/// A decoded answer: either a real value or one of the sentinel meanings
#[derive(Debug, Clone, PartialEq)]
pub enum Answer<T> {
    Known(T),
    DontKnow,
    Declined,
    DontRecall,
}

impl<T> From<Sentinel> for Answer<T> {
    fn from(sentinel: Sentinel) -> Self {
        match sentinel {
            Sentinel::DontKnow => Answer::DontKnow,
            Sentinel::Declined => Answer::Declined,
            Sentinel::DontRecall => Answer::DontRecall,
        }
    }
}

impl<T> Answer<T> {
    pub fn known(self) -> Option<T> {
        match self {
            Answer::Known(value) => Some(value),
            _ => None,
        }
    }

    /// Label of the sentinel meaning; `None` for a known value
    pub fn sentinel_label(&self) -> Option<&'static str> {
        match self {
            Answer::Known(_) => None,
            Answer::DontKnow => Some(Sentinel::DontKnow.label()),
            Answer::Declined => Some(Sentinel::Declined.label()),
            Answer::DontRecall => Some(Sentinel::DontRecall.label()),
        }
    }
}

/// Labels and sentinel tables per canonical field
#[derive(Debug, Clone)]
pub struct Codebook {
    labels: HashMap<CanonicalField, BTreeMap<i64, &'static str>>,
    sentinels: HashMap<CanonicalField, BTreeMap<i64, Sentinel>>,
}

impl Default for Codebook {
    fn default() -> Self {
        Self::vigitel()
    }
}

impl Codebook {
    /// The dictionaries published with the Vigitel questionnaire
    pub fn vigitel() -> Self {
        let mut labels = HashMap::new();
        let mut sentinels = HashMap::new();

        labels.insert(
            CanonicalField::City,
            table(&[
                (1, "aracaju"),
                (2, "belem"),
                (3, "belo horizonte"),
                (4, "boa vista"),
                (5, "campo grande"),
                (6, "cuiaba"),
                (7, "curitiba"),
                (8, "florianopolis"),
                (9, "fortaleza"),
                (10, "goiania"),
                (11, "joao pessoa"),
                (12, "macapa"),
                (13, "maceio"),
                (14, "manaus"),
                (15, "natal"),
                (16, "palmas"),
                (17, "porto alegre"),
                (18, "porto velho"),
                (19, "recife"),
                (20, "rio branco"),
                (21, "rio de janeiro"),
                (22, "salvador"),
                (23, "sao luis"),
                (24, "sao paulo"),
                (25, "teresina"),
                (26, "vitoria"),
                (27, "distrito federal"),
            ]),
        );
        labels.insert(
            CanonicalField::Sex,
            table(&[(1, "masculino"), (2, "feminino")]),
        );
        labels.insert(
            CanonicalField::MaritalStatus,
            table(&[
                (1, "solteiro"),
                (2, "casado legalmente"),
                (3, "tem união estável há mais de seis meses"),
                (4, "viúvo"),
                (5, "separado ou divorciado"),
            ]),
        );
        labels.insert(
            CanonicalField::ExercisesRegularly,
            table(&[(1, "sim"), (2, "não")]),
        );
        labels.insert(
            CanonicalField::ExerciseFrequencyBand,
            table(&[
                (1, "1 a 2 dias por semana"),
                (2, "3 a 4 dias por semana"),
                (3, "5 a 6 dias por semana"),
                (4, "todos os dias (inclusive sábado e domingo)"),
            ]),
        );
        labels.insert(
            CanonicalField::SmokingStatus,
            table(&[
                (1, "sim, diariamente"),
                (2, "sim, mas não diariamente"),
                (3, "não"),
            ]),
        );
        labels.insert(
            CanonicalField::SelfReportedRace,
            table(&[
                (1, "branca"),
                (2, "preta"),
                (3, "amarela"),
                (4, "parda"),
                (5, "indígena"),
            ]),
        );
        labels.insert(
            CanonicalField::Hypertension,
            table(&[(1, "sim"), (2, "não")]),
        );
        labels.insert(CanonicalField::Diabetes, table(&[(1, "sim"), (2, "não")]));

        let unknown_or_declined = || {
            BTreeMap::from([(777, Sentinel::DontKnow), (888, Sentinel::Declined)])
        };
        sentinels.insert(CanonicalField::Weight, unknown_or_declined());
        sentinels.insert(CanonicalField::Height, unknown_or_declined());
        sentinels.insert(CanonicalField::SelfReportedRace, unknown_or_declined());
        sentinels.insert(
            CanonicalField::MaritalStatus,
            BTreeMap::from([(888, Sentinel::Declined)]),
        );
        sentinels.insert(
            CanonicalField::Hypertension,
            BTreeMap::from([(777, Sentinel::DontRecall)]),
        );
        sentinels.insert(
            CanonicalField::Diabetes,
            BTreeMap::from([(777, Sentinel::DontRecall)]),
        );

        Self { labels, sentinels }
    }

    /// Sentinel meaning of a code for a field, if the code is reserved
    pub fn sentinel(&self, field: CanonicalField, code: i64) -> Option<Sentinel> {
        self.sentinels
            .get(&field)
            .and_then(|codes| codes.get(&code))
            .copied()
    }

    /// Label for an enumerated code, covering sentinel codes too
    pub fn label(&self, field: CanonicalField, code: i64) -> Option<&'static str> {
        self.labels
            .get(&field)
            .and_then(|codes| codes.get(&code))
            .copied()
            .or_else(|| self.sentinel(field, code).map(Sentinel::label))
    }

    /// Decode a numeric measurement such as weight or height
    ///
    /// Returns `None` for null or non-numeric cells.
    pub fn decode_measurement(&self, field: CanonicalField, cell: &Cell) -> Option<Answer<f64>> {
        if let Some(sentinel) = cell.as_i64().and_then(|code| self.sentinel(field, code)) {
            return Some(sentinel.into());
        }
        cell.as_f64().map(Answer::Known)
    }

    /// Human-readable rendering of a stored value
    pub fn describe(&self, field: CanonicalField, cell: &Cell) -> String {
        match cell.as_i64().and_then(|code| self.label(field, code)) {
            Some(label) => label.to_string(),
            None => cell.to_string(),
        }
    }
}

fn table(entries: &[(i64, &'static str)]) -> BTreeMap<i64, &'static str> {
    entries.iter().copied().collect()
}
