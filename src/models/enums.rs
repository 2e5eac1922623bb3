use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The wire form (serde) is the same lowercase string as `as_str`, and
/// deserializing goes through `FromStr` so bodies and paths parse alike.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String")]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StoreError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = StoreError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

str_enum!(Shift {
    Morning => "morning",
    Evening => "evening",
    Night => "night",
});

str_enum!(Outcome {
    Admitted => "admitted",
    Discharged => "discharged",
    Dama => "dama",
    DischargedAma => "discharged_ama",
    PatientReferred => "patient_referred",
    Transferred => "transferred",
    ConsultOnly => "consult_only",
});

impl Outcome {
    /// Both DAMA spellings count as discharged against medical advice.
    pub fn is_dama(&self) -> bool {
        matches!(self, Outcome::Dama | Outcome::DischargedAma)
    }

    pub fn is_admitted(&self) -> bool {
        matches!(self, Outcome::Admitted)
    }
}

str_enum!(SmsKind {
    Emergency => "emergency",
    Direct => "direct",
});

str_enum!(SmsStatus {
    Queued => "queued",
});
