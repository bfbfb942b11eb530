use rocket::http::Status;

/// Liveness probe, answers as long as the server is accepting connections.
#[rocket::get("/check")]
pub fn check() -> Status {
    Status::NoContent
}
