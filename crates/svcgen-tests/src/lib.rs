//! Interfaces from `interfaces.yaml` and the implementations svcgen renders
//! for them at build time.

pub mod models {
    /// Caller context passed through untouched
    #[derive(Debug, Default)]
    pub struct HttpRequest {
        pub trace_id: String,
    }
}

pub mod service {
    use svcgen_runtime::ServiceResult;

    pub trait Keys {
        fn get_keys(&self, path: String, filter: String) -> ServiceResult<Vec<String>>;

        fn put_key(
            &self,
            vault: String,
            name: &str,
            request_id: u64,
            tags: Vec<String>,
            key: &[u8],
        ) -> ServiceResult<()>;

        fn head_key(
            &self,
            name: String,
            context: crate::models::HttpRequest,
        ) -> ServiceResult<Option<String>>;

        fn describe(&self) -> ServiceResult<String> {
            Ok("keys".to_string())
        }
    }
}

pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/keys_impl.rs"));
}

pub use generated::KeysImpl;
