use forgery::crypto::{BlockHash, BlockPayloadHash, ContractId, KeyHash, PublicKey, Signature};
use forgery::entrypoint::{resolve, Entrypoint, EntrypointParameter};
use forgery::michelson::{IntoMicheline, Type, TypeNode};
use forgery::operation::{Consensus, Content, Manager, Operation, Parameters};
use forgery::pack::{pack, unpack};
use forgery::prelude::*;
use proptest::prelude::*;

fn manager(source: [u8; 20], fee: u64, counter: u64, gas: u64, storage: u64) -> Manager {
    Manager {
        source: KeyHash::Ed25519(source),
        fee: N::from(fee),
        counter: N::from(counter),
        gas_limit: N::from(gas),
        storage_limit: N::from(storage),
    }
}

fn micheline_leaf() -> impl Strategy<Value = Micheline> {
    prop_oneof![
        any::<i64>().prop_map(|i| Micheline::int(i)),
        "[a-z]{0,12}".prop_map(|s| Micheline::string(s)),
        proptest::collection::vec(any::<u8>(), 0..24).prop_map(|b| Micheline::bytes(b)),
        (0u8..=147u8).prop_map(|t| Micheline::prim(Prim::from_tag(t).unwrap())),
    ]
}

fn micheline_tree() -> impl Strategy<Value = Micheline> {
    micheline_leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(|items| Micheline::seq(items)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Micheline::pair(a, b)),
            inner.clone().prop_map(Micheline::some),
            inner.prop_map(Micheline::left),
        ]
    })
}

proptest! {
    #[test]
    fn zarith_n_roundtrip(value in any::<u128>()) {
        let n = N::from(num_bigint_from_u128(value));
        let bytes = n.to_bytes();
        prop_assert_eq!(N::decode(bytes), n);
    }

    #[test]
    fn zarith_z_roundtrip(value in any::<i128>()) {
        let z = Z::from(num_bigint_from_i128(value));
        let bytes = z.to_bytes();
        prop_assert_eq!(Z::decode(bytes), z);
    }

    #[test]
    fn micheline_codec_roundtrip(value in micheline_tree()) {
        let bytes = value.to_bytes();
        prop_assert_eq!(Micheline::decode(bytes), value);
    }

    #[test]
    fn pack_unpack_mirror_without_schema(value in micheline_tree()) {
        let packed = pack(&value, None).unwrap();
        prop_assert_eq!(unpack(&packed, None).unwrap(), value);
    }

    #[test]
    fn manager_operation_roundtrip(
        source in proptest::array::uniform20(any::<u8>()),
        branch in proptest::array::uniform32(any::<u8>()),
        fee in 0u64..10_000_000,
        counter in 0u64..1 << 48,
        amount in 0u64..1 << 60,
        destination in proptest::array::uniform20(any::<u8>()),
    ) {
        let op = Operation::unsigned(
            BlockHash::new(branch),
            vec![Content::Transaction {
                manager: manager(source, fee, counter, 10_000, 257),
                amount: N::from(amount),
                destination: ContractId::Implicit(KeyHash::Secp256k1(destination)),
                parameters: None,
            }],
        );
        let bytes = op.forge();
        let parsed = Operation::unforge(&bytes).unwrap();
        prop_assert_eq!(&parsed, &op);
        // bytes-level fixpoint: re-forging a parsed operation is identity
        prop_assert_eq!(parsed.forge(), bytes);
    }

    #[test]
    fn consensus_operation_roundtrip(
        branch in proptest::array::uniform32(any::<u8>()),
        slot in any::<u16>(),
        level in 0i32..i32::MAX,
        round in 0i32..64,
        payload in proptest::array::uniform32(any::<u8>()),
    ) {
        let op = Operation::unsigned(
            BlockHash::new(branch),
            vec![Content::Endorsement(Consensus {
                slot,
                level,
                round,
                block_payload_hash: BlockPayloadHash::new(payload),
            })],
        );
        let bytes = op.forge();
        prop_assert_eq!(Operation::unforge(&bytes).unwrap(), op);
    }
}

// proptest's `any` does not produce BigInt directly; widen from the
// primitive domains instead
fn num_bigint_from_u128(value: u128) -> num_bigint::BigUint {
    num_bigint::BigUint::from(value)
}

fn num_bigint_from_i128(value: i128) -> num_bigint::BigInt {
    num_bigint::BigInt::from(value)
}

#[test]
fn resolve_pack_forge_end_to_end() {
    // entrypoint type: pair (nat %amount) (option %note string)
    let parameter_type = Type::new(TypeNode::Pair(vec![
        Type::new(TypeNode::Nat).field("amount"),
        Type::new(TypeNode::Option(Box::new(Type::new(TypeNode::String)))).field("note"),
    ]))
    .into_micheline();

    let value = resolve(
        &parameter_type,
        EntrypointParameter::object(vec![
            EntrypointParameter::named_object(
                "note",
            vec![EntrypointParameter::value(Micheline::string("hello"))],
            ),
            EntrypointParameter::named_value("amount", 12),
        ]),
    )
    .unwrap();

    assert_eq!(
        value,
        Micheline::pair(
            Micheline::int(12),
            Micheline::some(Micheline::string("hello"))
        )
    );

    // the resolved value packs under its schema
    let packed = pack(&value, Some(&parameter_type)).unwrap();
    assert_eq!(unpack(&packed, Some(&parameter_type)).unwrap(), value);

    // and travels inside a forged transaction
    let op = Operation::unsigned(
        BlockHash::from_base58("BLyKu3tnc9NCuiFfCqfeVGPCoZTyW63dYh2XAYxkM7fQYKCqsju").unwrap(),
        vec![Content::Transaction {
            manager: manager([0x31; 20], 1_420, 42, 10_600, 300),
            amount: N::from(0u8),
            destination: ContractId::Originated(forgery::crypto::ContractHash::new([0x55; 20])),
            parameters: Some(Parameters {
                entrypoint: Entrypoint::named("fund"),
                value,
            }),
        }],
    );
    let bytes = op.forge();
    let parsed = Operation::unforge(&bytes).unwrap();
    assert_eq!(parsed, op);
    assert_eq!(parsed.forge(), bytes);
}

#[test]
fn signing_is_pure_and_verifiable() {
    struct FixedSigner(Signature);

    impl forgery::client::Signer for FixedSigner {
        fn sign(
            &self,
            _message: &[u8],
        ) -> Result<Signature, forgery::client::SignerError> {
            Ok(self.0)
        }

        fn verify(&self, _message: &[u8], signature: &Signature) -> bool {
            signature == &self.0
        }
    }

    let signer = FixedSigner(Signature([0x2c; 64]));
    let unsigned = Operation::unsigned(
        BlockHash::new([0x77; 32]),
        vec![Content::Reveal {
            manager: manager([0x08; 20], 1_300, 5, 10_000, 0),
            public_key: PublicKey::Ed25519([0x44; 32]),
        }],
    );

    let signed = unsigned.sign(&signer).unwrap();
    assert_eq!(unsigned.signature, None, "signing must not mutate");
    assert!(signed.verify(&signer));
    assert!(!unsigned.verify(&signer));

    let reparsed = Operation::unforge_signed(&signed.forge()).unwrap();
    assert_eq!(reparsed, signed);
}
