//! Shared plumbing for the console and the reference API: logging setup,
//! runtime directory checks and the small JSON shapes both sides agree on.

pub mod types;
pub mod utils;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }
}
