//! Request ID middleware for the HTTP stack.
//!
//! # Design
//! - Generation and propagation of `x-request-id` are separate layers so the
//!   trace span sits between them and can read the generated id.

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Layer assigning a UUID `x-request-id` to requests that lack one.
#[must_use]
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer copying the request's `x-request-id` onto the response.
#[must_use]
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_layers_can_be_constructed() {
        let _set_layer = set_request_id_layer();
        let _prop_layer = propagate_request_id_layer();
    }
}
