use kstate_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid {list} allow list: {source}")]
    AllowList {
        list: &'static str,
        #[source]
        source: CoreError,
    },

    #[error("namespaces denylist can only be used when watching all namespaces")]
    DenylistWithNamespaces,

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}
