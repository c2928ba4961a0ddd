use corral_derive::api_handler;
use corral_domain::constants::SYSTEM_TAG;

#[api_handler(
    get,
    path = "/healthcheck",
    responses((status = OK, description = "An endpoint to invoke for the healthcheck")),
    tag = SYSTEM_TAG,
)]
/// Performs a healthcheck and returns an empty 200 response.
pub(super) async fn healthcheck_handler() -> &'static str {
    ""
}
