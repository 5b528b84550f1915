//! BIP32 test vectors.
//!
//! Sourced from: <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki#Test_Vectors>

#![cfg(all(feature = "alloc", feature = "secp256k1"))]

use hdkey::HDKey;
use hex_literal::hex;

/// Derive an [`HDKey`] for the given seed and derivation path.
fn derive(seed: &[u8], path: &str) -> HDKey {
    let master = HDKey::from_seed(seed, None).unwrap();
    if path == "m" {
        return master;
    }
    let rel = path.strip_prefix("m/").unwrap();
    master
        .derive_path(None, &rel.parse().unwrap(), true, None, None, None)
        .unwrap()
}

/// BIP32 Test Vector 1
/// <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki#Test_vector_1>
#[test]
fn test_vector_1() {
    let seed = hex!("000102030405060708090a0b0c0d0e0f");

    let key_m = derive(&seed, "m");
    assert_eq!(
        key_m.base58_private().unwrap(),
        "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
    );
    assert_eq!(
        key_m.public().base58_public().unwrap(),
        "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
    );

    let key_m_0h = derive(&seed, "m/0'");
    assert_eq!(
        key_m_0h.base58_private().unwrap(),
        "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7"
    );

    let key_m_0h_1 = derive(&seed, "m/0'/1");
    assert_eq!(
        key_m_0h_1.base58_private().unwrap(),
        "xprv9wTYmMFdV23N2TdNG573QoEsfRrWKQgWeibmLntzniatZvR9BmLnvSxqu53Kw1UmYPxLgboyZQaXwTCg8MSY3H2EU4pWcQDnRnrVA1xe8fs"
    );

    let key_m_0h_1_2h = derive(&seed, "m/0'/1/2'");
    assert_eq!(
        key_m_0h_1_2h.base58_private().unwrap(),
        "xprv9z4pot5VBttmtdRTWfWQmoH1taj2axGVzFqSb8C9xaxKymcFzXBDptWmT7FwuEzG3ryjH4ktypQSAewRiNMjANTtpgP4mLTj34bhnZX7UiM"
    );

    let key_m_0h_1_2h_2 = derive(&seed, "m/0'/1/2'/2");
    assert_eq!(
        key_m_0h_1_2h_2.base58_private().unwrap(),
        "xprvA2JDeKCSNNZky6uBCviVfJSKyQ1mDYahRjijr5idH2WwLsEd4Hsb2Tyh8RfQMuPh7f7RtyzTtdrbdqqsunu5Mm3wDvUAKRHSC34sJ7in334"
    );

    let key_m_0h_1_2h_2_1000000000 = derive(&seed, "m/0'/1/2'/2/1000000000");
    assert_eq!(
        key_m_0h_1_2h_2_1000000000.base58_private().unwrap(),
        "xprvA41z7zogVVwxVSgdKUHDy1SKmdb533PjDz7J6N6mV6uS3ze1ai8FHa8kmHScGpWmj4WggLyQjgPie1rFSruoUihUZREPSL39UNdE3BBDu76"
    );

    // Non-hardened derivation from a public-only key matches derivation
    // from the equivalent private key.
    let xpub = key_m_0h_1_2h.public();
    let xpub_child = xpub
        .derive_path(None, &"2".parse().unwrap(), true, None, None, None)
        .unwrap();
    assert_eq!(
        xpub_child.key_data(),
        key_m_0h_1_2h_2.public().key_data()
    );
}

/// BIP32 Test Vector 2
/// <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki#Test_vector_2>
#[test]
fn test_vector_2() {
    let seed = hex!(
        "fffcf9f6f3f0edeae7e4e1dedbd8d5d2cfccc9c6c3c0bdbab7b4b1aeaba8a5a2
         9f9c999693908d8a8784817e7b7875726f6c696663605d5a5754514e4b484542"
    );

    let key_m = derive(&seed, "m");
    assert_eq!(
        key_m.base58_private().unwrap(),
        "xprv9s21ZrQH143K31xYSDQpPDxsXRTUcvj2iNHm5NUtrGiGG5e2DtALGdso3pGz6ssrdK4PFmM8NSpSBHNqPqm55Qn3LqFtT2emdEXVYsCzC2U"
    );

    let key_m_0 = derive(&seed, "m/0");
    assert_eq!(
        key_m_0.base58_private().unwrap(),
        "xprv9vHkqa6EV4sPZHYqZznhT2NPtPCjKuDKGY38FBWLvgaDx45zo9WQRUT3dKYnjwih2yJD9mkrocEZXo1ex8G81dwSM1fwqWpWkeS3v86pgKt"
    );

    let key_m_0_2147483647h = derive(&seed, "m/0/2147483647'");
    assert_eq!(
        key_m_0_2147483647h.base58_private().unwrap(),
        "xprv9wSp6B7kry3Vj9m1zSnLvN3xH8RdsPP1Mh7fAaR7aRLcQMKTR2vidYEeEg2mUCTAwCd6vnxVrcjfy2kRgVsFawNzmjuHc2YmYRmagcEPdU9"
    );

    let key_m_0_2147483647h_1 = derive(&seed, "m/0/2147483647'/1");
    assert_eq!(
        key_m_0_2147483647h_1.base58_private().unwrap(),
        "xprv9zFnWC6h2cLgpmSA46vutJzBcfJ8yaJGg8cX1e5StJh45BBciYTRXSd25UEPVuesF9yog62tGAQtHjXajPPdbRCHuWS6T8XA2ECKADdw4Ef"
    );

    let key_m_0_2147483647h_1_2147483646h =
        derive(&seed, "m/0/2147483647'/1/2147483646'");
    assert_eq!(
        key_m_0_2147483647h_1_2147483646h.base58_private().unwrap(),
        "xprvA1RpRA33e1JQ7ifknakTFpgNXPmW2YvmhqLQYMmrj4xJXXWYpDPS3xz7iAxn8L39njGVyuoseXzU6rcxFLJ8HFsTjSyQbLYnMpCqE2VbFWc"
    );

    let key_m_0_2147483647h_1_2147483646h_2 =
        derive(&seed, "m/0/2147483647'/1/2147483646'/2");
    assert_eq!(
        key_m_0_2147483647h_1_2147483646h_2.base58_private().unwrap(),
        "xprvA2nrNbFZABcdryreWet9Ea4LvTJcGsqrMzxHx98MMrotbir7yrKCEXw7nadnHM8Dq38EGfSh6dqA9QWTyefMLEcBYJUuekgW4BYPJcr9E7j"
    );

    let xpub = key_m_0_2147483647h_1_2147483646h.public();
    let xpub_child = xpub
        .derive_path(None, &"2".parse().unwrap(), true, None, None, None)
        .unwrap();
    assert_eq!(
        xpub_child.key_data(),
        key_m_0_2147483647h_1_2147483646h_2.public().key_data()
    );
}

/// BIP32 Test Vector 3 (leading-zero retention).
/// <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki#Test_vector_3>
#[test]
fn test_vector_3() {
    let seed = hex!(
        "4b381541583be4423346c643850da4b320e46a87ae3d2a4e6da11eba819cd4ac
         ba45d239319ac14f863b8d5ab5a0d0c64d2e8a1e7d1457df2e5a3c51c73235be"
    );

    let key_m = derive(&seed, "m");
    assert_eq!(
        key_m.base58_private().unwrap(),
        "xprv9s21ZrQH143K25QhxbucbDDuQ4naNntJRi4KUfWT7xo4EKsHt2QJDu7KXp1A3u7Bi1j8ph3EGsZ9Xvz9dGuVrtHHs7pXeTzjuxBrCmmhgC6"
    );

    let key_m_0h = derive(&seed, "m/0'");
    assert_eq!(
        key_m_0h.base58_private().unwrap(),
        "xprv9uPDJpEQgRQfDcW7BkF7eTya6RPxXeJCqCJGHuCJ4GiRVLzkTXBAJMu2qaMWPrS7AANYqdq6vcBcBUdJCVVFceUvJFjaPdGZ2y9WACViL4L"
    );
}

/// BIP32 Test Vector 4 (leading-zero retention).
/// <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki#test-vector-4>
#[test]
fn test_vector_4() {
    let seed = hex!("3ddd5602285899a946114506157c7997e5444528f3003f6134712147db19b678");

    let key_m = derive(&seed, "m");
    assert_eq!(
        key_m.base58_private().unwrap(),
        "xprv9s21ZrQH143K48vGoLGRPxgo2JNkJ3J3fqkirQC2zVdk5Dgd5w14S7fRDyHH4dWNHUgkvsvNDCkvAwcSHNAQwhwgNMgZhLtQC63zxwhQmRv"
    );

    let key_m_0h_1h = derive(&seed, "m/0'/1'");
    assert_eq!(
        key_m_0h_1h.base58_private().unwrap(),
        "xprv9xJocDuwtYCMNAo3Zw76WENQeAS6WGXQ55RCy7tDJ8oALr4FWkuVoHJeHVAcAqiZLE7Je3vZJHxspZdFHfnBEjHqU5hG1Jaj32dVoS6XLT1"
    );
}
