//! Status enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` table, and `name()` matches its `name`
//! column.

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Return the lookup table `name` for this status.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Resolve a database status ID back into the enum.
            pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
                match id {
                    $( $val => Ok($name::$variant), )+
                    other => Err(CoreError::Internal(format!(
                        "Unknown {} id {other}",
                        stringify!($name)
                    ))),
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

define_status_enum! {
    /// Review status of a wiki draft.
    ApprovalStatus {
        Pending = 1 => "pending",
        UnderReview = 2 => "under_review",
        Approved = 3 => "approved",
        Rejected = 4 => "rejected",
    }
}

define_status_enum! {
    /// Lifecycle of an agency/talent affiliation.
    AffiliationStatus {
        Pending = 1 => "pending",
        Active = 2 => "active",
        Rejected = 3 => "rejected",
        Terminated = 4 => "terminated",
    }
}

define_status_enum! {
    /// Payment lifecycle as mirrored from the gateway.
    PaymentStatus {
        Pending = 1 => "pending",
        Authorized = 2 => "authorized",
        Captured = 3 => "captured",
        Failed = 4 => "failed",
        Refunded = 5 => "refunded",
    }
}

define_status_enum! {
    /// Payout transfer execution status.
    TransferStatus {
        Pending = 1 => "pending",
        Sent = 2 => "sent",
        Failed = 3 => "failed",
    }
}

define_status_enum! {
    /// Settlement batch status.
    SettlementBatchStatus {
        Open = 1 => "open",
        Closed = 2 => "closed",
        Paid = 3 => "paid",
    }
}
