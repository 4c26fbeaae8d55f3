use uuid::Uuid;

const ID_PREFIX: &str = "sv";

/// Opaque id for users and tokens: a short prefix and a hyphen-less v4 UUID.
pub fn generate_id() -> String {
    format!("{ID_PREFIX}{}", Uuid::new_v4().simple())
}
