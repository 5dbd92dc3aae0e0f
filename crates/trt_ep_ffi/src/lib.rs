//! ABI boundary for the TensorRT provider adapter.
//!
//! Fixed-layout option structs, owned-string transfer, external/internal
//! translation, and the exported `GetProvider` function table.

pub mod abi;
pub mod api;
pub mod config;
pub mod owned_str;
pub mod provider;
pub mod translate;

pub use abi::{OrtTensorRTProviderOptions, OrtTensorRTProviderOptionsV2, FIELD_COMPATIBILITY};
pub use api::{GetProvider, ProviderOptionsList, TensorrtProviderApi, PROVIDER_API_VERSION};
pub use owned_str::OwnedCStr;
pub use provider::{process_kernel_registry, provider, TensorrtProvider};
pub use translate::{
    info_from_external, info_to_external, release_option_strings, update_external, AbiError,
    ExportedOptions, ExternalOptions, OptionsVersion,
};
