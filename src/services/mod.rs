//! Per-resource operations. Each service is a copyable view over the shared
//! [`Client`] pipeline and only knows its paths and root keys. Operations
//! take the view by value, so their futures borrow the client alone and can
//! be stored or joined.
//!
//! [`Client`]: crate::Client

mod attachments;
mod labels;
mod memberships;
mod organizations;
mod transactions;

pub use attachments::Attachments;
pub use labels::Labels;
pub use memberships::Memberships;
pub use organizations::Organizations;
pub use transactions::Transactions;

use crate::error::QontoError;

// Views only hold `&Client`, so they are copyable whatever the transport is.
macro_rules! copyable_view {
    ($($view:ident),+ $(,)?) => {
        $(
            impl<T> Clone for $view<'_, T> {
                fn clone(&self) -> Self {
                    *self
                }
            }

            impl<T> Copy for $view<'_, T> {}
        )+
    };
}

copyable_view!(Attachments, Labels, Memberships, Organizations, Transactions);

/// Path of a single resource under `base`, rejecting empty ids before any
/// network activity.
fn resource_path(base: &str, id: &str, what: &'static str) -> Result<String, QontoError> {
    if id.trim().is_empty() {
        return Err(QontoError::InvalidParameter(what));
    }
    Ok(format!("{}/{}", base, id))
}
