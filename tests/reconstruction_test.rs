use shamir_gf256::{
    Config, SecretReconstructor, SecureRandom, ShamirError, ShamirShare, Share,
    ShareAuthenticator, SplitMode,
};

fn seeded_scheme(total_shares: u8, threshold: u8) -> ShamirShare {
    ShamirShare::builder(total_shares, threshold)
        .build_with_rng(SecureRandom::from_seed([21u8; 32]))
        .unwrap()
}

#[test]
fn test_verification_accepts_consistent_shares() {
    let mut shamir = seeded_scheme(7, 3);
    let shares = shamir.split_byte(123).unwrap();

    let result = SecretReconstructor::reconstruct_with_verification(&shares, 3).unwrap();
    assert!(result.is_success());
    assert_eq!(result.secret, Some(123));
    assert_eq!(result.windows_checked, 4);
    assert_eq!(result.windows_skipped, 0);
}

#[test]
fn test_verification_flags_tampered_share() {
    let mut shamir = seeded_scheme(6, 3);
    let mut shares = shamir.split_byte(123).unwrap();
    shares[5].y ^= 0x80;

    let result = SecretReconstructor::reconstruct_with_verification(&shares, 3).unwrap();
    assert!(!result.is_success());
    assert_eq!(result.secret, None);
    assert!(
        result
            .error
            .as_deref()
            .is_some_and(|e| e.contains("disagree"))
    );
}

#[test]
fn test_verification_counts_malformed_extra_share() {
    let mut shamir = seeded_scheme(5, 3);
    let mut shares = shamir.split_byte(50).unwrap();
    shares.push(Share::new(shares[3].x, 1));

    let result = SecretReconstructor::reconstruct_with_verification(&shares, 3).unwrap();
    assert_eq!(result.secret, Some(50));
    assert_eq!(result.windows_checked, 2);
    assert_eq!(result.windows_skipped, 1);
}

#[test]
fn test_authenticated_split_and_reconstruct() {
    let mut rng = SecureRandom::new().unwrap();
    let authenticator = ShareAuthenticator::generate(&mut rng).unwrap();
    let mut shamir = ShamirShare::new(5, 3).unwrap();

    let tagged = shamir.split_authenticated(0xC3, &authenticator).unwrap();
    assert_eq!(
        SecretReconstructor::reconstruct_from_secure_shares(&tagged[2..], &authenticator).unwrap(),
        0xC3
    );

    let other = ShareAuthenticator::generate(&mut rng).unwrap();
    assert!(matches!(
        SecretReconstructor::reconstruct_from_secure_shares(&tagged, &other),
        Err(ShamirError::ShareAuthenticationFailed { .. })
    ));
}

#[test]
fn test_batch_reconstruction_modes_agree() {
    let mut shamir = seeded_scheme(5, 3);
    let secrets: Vec<u8> = (0..64).map(|i| (i * 7) as u8).collect();
    let groups: Vec<Vec<Share>> = secrets
        .iter()
        .map(|&s| shamir.split_byte(s).unwrap()[1..4].to_vec())
        .collect();

    let sequential = SecretReconstructor::with_mode(SplitMode::Sequential)
        .reconstruct_multiple(&groups, 3)
        .unwrap();
    let parallel = SecretReconstructor::with_mode(SplitMode::Parallel)
        .reconstruct_multiple(&groups, 3)
        .unwrap();

    assert_eq!(sequential, secrets);
    assert_eq!(parallel, secrets);
}

#[test]
fn test_batch_fails_fast_on_short_group() {
    let mut shamir = seeded_scheme(5, 3);
    let mut groups: Vec<Vec<Share>> = (0..4).map(|s| shamir.split_byte(s).unwrap()).collect();
    groups[2].truncate(2);

    let config = Config::new().with_mode(SplitMode::Parallel);
    let reconstructor = SecretReconstructor::with_config(&config);
    assert_eq!(
        reconstructor.reconstruct_multiple(&groups, 3),
        Err(ShamirError::InsufficientShares { needed: 3, got: 2 })
    );
}

#[test]
fn test_share_sets_in_parallel_mode() {
    let secret: Vec<u8> = (0..=255u8).collect();
    let mut shamir = ShamirShare::builder(8, 5)
        .with_config(Config::new().with_mode(SplitMode::Parallel))
        .build()
        .unwrap();
    let share_sets = shamir.split(&secret).unwrap();

    let reconstructed = shamir
        .reconstructor()
        .reconstruct_from_share_sets(&share_sets[3..])
        .unwrap();
    assert_eq!(reconstructed, secret);
}

#[test]
fn test_malformed_share_set_rejected() {
    let mut shamir = seeded_scheme(3, 2);
    let mut share_sets = shamir.split(b"abc").unwrap();
    share_sets[1].shares.pop();

    assert!(matches!(
        ShamirShare::reconstruct(&share_sets),
        Err(ShamirError::InvalidShare(_))
    ));
}
