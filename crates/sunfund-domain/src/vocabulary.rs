//! Vocabulary module - the closed value sets of the record schema
//!
//! Every enumerated field of an [`ExtractedRecord`](crate::ExtractedRecord) is
//! serialized with the same spelling the extraction prompt asks the model for
//! (e.g. `"M&A Update"`, `"PV-Diesel-Storage Hybrid"`). Compact spellings such
//! as `MAndAUpdate` are accepted as aliases when parsing.
//!
//! Sets that allow `"n/a"` carry an explicit `NotAvailable` variant: the field
//! applies to the record but the article does not say. A Rust `None` on the
//! owning field means the field does not apply at all.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Spelling used for "applies, but unknown from the source text"
pub const NOT_AVAILABLE: &str = "n/a";

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every value of the set, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical spelling
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Parse a canonical spelling or one of its aliases
            pub fn parse(s: &str) -> Option<Self> {
                match s.trim() {
                    $($wire $(| $alias)* => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Canonical spellings of every value
            pub fn spellings() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s).ok_or_else(|| {
                    format!(
                        "invalid {} '{}', expected one of {:?}",
                        stringify!($name),
                        s,
                        Self::spellings()
                    )
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(D::Error::custom)
            }
        }
    };
}

vocabulary! {
    /// Category of a news update
    NewsUpdateType {
        /// A project or organization received funding
        FundingUpdate => "Funding Update" | "FundingUpdate",
        /// Acquisition or purchase of a project or organization
        MAndAUpdate => "M&A Update" | "MAndAUpdate" | "M&A",
        /// Anything that is neither funding nor M&A
        GeneralUpdate => "General Update" | "GeneralUpdate",
        /// Not a solar financing update
        Other => "Other",
    }
}

vocabulary! {
    /// What kind of entity received the investment
    ReceiverCategory {
        /// A solar project
        Project => "Project",
        /// An organization
        Organization => "Organization",
        /// Neither of the above
        Other => "Other",
    }
}

vocabulary! {
    /// Role of an organization that received investment
    OrganizationRole {
        /// Government body
        Government => "Government",
        /// Utility company
        Utility => "Utility",
        /// Fund or special purpose vehicle
        FinancingVehicle => "Financing Vehicle" | "FinancingVehicle",
        /// Electric mobility company
        EMobility => "E-Mobility" | "EMobility",
        /// Pay-as-you-go solar home systems provider
        PaygShs => "PAYG SHS" | "PAYG_SHS",
    }
}

vocabulary! {
    /// Lifecycle status of a financed project
    ProjectStatus {
        /// Under planning
        Planning => "Planning",
        /// Commissioned
        Commissioned => "Commissioned",
        /// Under construction
        Construction => "Construction",
        /// In operation
        Operational => "Operational",
        /// Applies but not stated in the article
        NotAvailable => "n/a" | "N/A",
    }
}

vocabulary! {
    /// Generation and storage technology of a project
    TechnologyAndGridSystem {
        /// Photovoltaic only
        Pv => "PV",
        /// PV with diesel and storage
        PvDieselStorageHybrid => "PV-Diesel-Storage Hybrid",
        /// PV with storage
        PvStorage => "PV-Storage",
        /// Applies but not stated in the article
        NotAvailable => "n/a" | "N/A",
    }
}

vocabulary! {
    /// Installation segment of a project
    TypeOfInstallation {
        /// Commercial and industrial
        CAndI => "C&I",
        /// Utility scale
        Utility => "Utility",
        /// Mini-grid
        MiniGrid => "Mini-grid" | "Mini-Grid",
        /// Applies but not stated in the article
        NotAvailable => "n/a" | "N/A",
    }
}

vocabulary! {
    /// Grid connection of a project
    GridType {
        /// Connected to the grid
        OnGrid => "On-grid" | "On-Grid",
        /// Off the grid
        OffGrid => "Off-Grid" | "Off-grid",
        /// Applies but not stated in the article
        NotAvailable => "n/a" | "N/A",
    }
}

vocabulary! {
    /// Role of a party named in a sub-update
    SubUpdateRole {
        /// Engineering, procurement and construction contractor
        EpcContractor => "EPC Contractor" | "EPCContractor",
        /// Provided financing
        Financier => "Financier",
        /// Equipment supplier
        Supplier => "Supplier",
        /// Buyer of the generated power
        OffTaker => "Off-taker" | "OffTaker",
        /// Manages the investing fund
        FundManager => "Fund Manager" | "FundManager",
        /// Owner of the asset
        Owner => "Owner",
    }
}

vocabulary! {
    /// Financing instrument provided by a financier
    Instrument {
        /// Loan or bond
        Debt => "Debt",
        /// Grant
        Grant => "Grant",
        /// Equity stake
        Equity => "Equity",
        /// Applies but not stated in the article
        NotAvailable => "n/a" | "N/A",
    }
}
