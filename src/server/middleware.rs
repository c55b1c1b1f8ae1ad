// Request ID middleware for fetch signals
// Author: kelexine (https://github.com/kelexine)

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Tags every fetch signal with an `x-request-id` (kept if the client sent
/// one) and echoes it on the response, so a hit, miss or fallback logged by
/// the trace layer can be matched to the request that caused it.
pub fn request_id_layers() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    (
        SetRequestIdLayer::x_request_id(MakeRequestUuid),
        PropagateRequestIdLayer::x_request_id(),
    )
}
