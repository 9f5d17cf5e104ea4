#![no_main]

use libfuzzer_sys::fuzz_target;
use shamir_gf256::{
    ProgressiveReconstructor, SecretReconstructor, ShamirShare, Share, ShareSet, ShareSetId,
    SplitMode,
};

// Feeds arbitrary share sets and bare shares into every reconstruction entry
// point. Malformed input (x = 0, duplicate x, mismatched metadata or lengths,
// out-of-range thresholds) must produce an Err, never a panic.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let threshold = data[0];
    let total_shares = data[1];
    let secret_length = (data[2] % 16) as usize;
    let set_count = (data[3] % 12) as usize;
    let id = ShareSetId([data[4]; 16]);
    let mut offset = 5;

    let mut share_sets = Vec::with_capacity(set_count);
    for i in 0..set_count {
        if offset >= data.len() {
            break;
        }
        let x = data[offset];
        offset += 1;

        let shares: Vec<Share> = (0..secret_length)
            .map(|j| Share::new(x, data.get(offset + j).copied().unwrap_or(0)))
            .collect();
        offset += secret_length;

        share_sets.push(ShareSet {
            id,
            index: Some(i as u8),
            threshold,
            total_shares,
            // Occasionally lie about the length
            secret_length: if x & 0x80 != 0 { secret_length + 1 } else { secret_length },
            shares,
        });
    }

    let _ = ShamirShare::reconstruct(&share_sets);
    let _ = SecretReconstructor::with_mode(SplitMode::Parallel).reconstruct_from_share_sets(&share_sets);

    let shares: Vec<Share> = data[5..]
        .chunks_exact(2)
        .map(|pair| Share::new(pair[0], pair[1]))
        .collect();
    let k = threshold as usize;

    let _ = SecretReconstructor::reconstruct_secret(&shares);
    let _ = SecretReconstructor::reconstruct_with_threshold(&shares, k);
    let _ = SecretReconstructor::reconstruct_with_verification(&shares, k);

    let groups: Vec<&[Share]> = shares.chunks(3).collect();
    let _ = SecretReconstructor::new().reconstruct_multiple(&groups, k);

    if let Ok(mut progressive) = ProgressiveReconstructor::new(k) {
        for share in &shares {
            let _ = progressive.add_share(*share);
        }
        assert!(progressive.progress() <= 1.0);
    }
});
