use rand::Rng;
use uuid::Uuid;

/// Run id drawn from the session RNG, so a seed reproduces it.
pub fn generate_uuid(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::make_rng;

    #[test]
    fn same_seed_same_run_id() {
        let id = generate_uuid(&mut make_rng());
        assert_eq!(id, generate_uuid(&mut make_rng()));
        assert_eq!(id.get_version(), Some(uuid::Version::Random));
    }

    #[test]
    fn consecutive_draws_differ() {
        let mut rng = make_rng();
        assert_ne!(generate_uuid(&mut rng), generate_uuid(&mut rng));
    }
}
