pub mod bilibili;

use crate::error::Result;

/// Blocking GET transport used by the remote cache tiers.
/// The Bilibili client implements it over reqwest; tests use a recording fake.
pub trait HttpGet {
    /// Fetches the body of `url`. Transport failures and non-2xx statuses are errors.
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
pub mod fake {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::HttpGet;
    use crate::error::{Error, Result};

    /// In-memory routes; every request is recorded.
    #[derive(Clone, Default)]
    pub struct FakeHttp {
        routes: Rc<RefCell<HashMap<String, Vec<u8>>>>,
        requests: Rc<RefCell<Vec<String>>>,
    }

    impl FakeHttp {
        pub fn route(&self, url: &str, body: impl Into<Vec<u8>>) {
            self.routes.borrow_mut().insert(url.to_string(), body.into());
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl HttpGet for FakeHttp {
        fn get(&self, url: &str) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push(url.to_string());
            self.routes
                .borrow()
                .get(url)
                .cloned()
                .ok_or_else(|| Error::remote(url, "HTTP status client error (404 Not Found)"))
        }
    }
}
