//! Recovery phrase to keypair, and back into the signing path.

use persona_mint::{
    domain::recover_keypairs,
    models::LedgerError,
    utils::load_keypair_from_base58,
};
use solana_sdk::signature::Signer;

use crate::integration::common::logging::init_test_logging;

const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const DEFAULT_ACCOUNT_ADDRESS: &str = "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk";

#[test]
fn test_recovered_candidate_loads_as_signing_key() {
    init_test_logging();
    let report = recover_keypairs(PHRASE, None, "").unwrap();
    assert!(report.candidates.len() > 2);
    assert_eq!(report.matches().count(), 0);

    for candidate in &report.candidates {
        let keypair = load_keypair_from_base58(&candidate.secret_key).unwrap();
        assert_eq!(keypair.pubkey().to_string(), candidate.address);
    }
}

#[test]
fn test_target_picks_out_its_scheme() {
    init_test_logging();
    let all = recover_keypairs(PHRASE, None, "").unwrap();
    let wanted = all.candidates.last().unwrap();

    // Pasted phrases arrive with odd casing and spacing.
    let messy = format!("  {}  ", PHRASE.to_uppercase().replace(' ', "   "));
    let report = recover_keypairs(&messy, Some(&wanted.address), "").unwrap();

    assert_eq!(report.matched_labels(), vec![wanted.label.as_str()]);
    assert_eq!(report.target.as_deref(), Some(wanted.address.as_str()));
}

#[test]
fn test_known_wallet_address_matches_default_account_path() {
    init_test_logging();
    let report = recover_keypairs(PHRASE, Some(DEFAULT_ACCOUNT_ADDRESS), "").unwrap();

    assert_eq!(report.matched_labels(), vec!["m/44'/501'/0'/0'"]);
    let matched = report.matches().next().unwrap();
    let keypair = load_keypair_from_base58(&matched.secret_key).unwrap();
    assert_eq!(keypair.pubkey().to_string(), DEFAULT_ACCOUNT_ADDRESS);
}

#[test]
fn test_bad_input_maps_to_input_rejected() {
    init_test_logging();
    let bad_phrase = recover_keypairs("abandon abandon", None, "").unwrap_err();
    assert!(matches!(
        LedgerError::from(bad_phrase),
        LedgerError::InputRejected(_)
    ));

    let bad_target = recover_keypairs(PHRASE, Some("not-an-address"), "").unwrap_err();
    assert!(matches!(
        LedgerError::from(bad_target),
        LedgerError::InputRejected(_)
    ));
}
