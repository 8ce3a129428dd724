//! Dynamic call builders.
//!
//! Calls are encoded against the node's metadata at submission time, so no
//! generated runtime types are needed. A shape the runtime does not accept
//! fails at submission with [`ChainError::Rpc`](crate::chain::types::ChainError).

use subxt::dynamic::Value;
use subxt::tx::DynamicPayload;
use subxt::utils::AccountId32;

/// `Balances::transfer_keep_alive(dest, value)`.
pub fn transfer_keep_alive(dest: &AccountId32, amount: u128) -> DynamicPayload {
    subxt::dynamic::tx(
        "Balances",
        "transfer_keep_alive",
        vec![
            Value::unnamed_variant("Id", [Value::from_bytes(dest.0)]),
            Value::u128(amount),
        ],
    )
}

/// `System::remark_with_event(remark)`.
pub fn remark_with_event(remark: &[u8]) -> DynamicPayload {
    subxt::dynamic::tx("System", "remark_with_event", vec![Value::from_bytes(remark)])
}

/// Parameter or result type a service job declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Uint8,
    Bytes,
}

impl FieldType {
    fn value(self) -> Value {
        match self {
            FieldType::Uint8 => Value::unnamed_variant("Uint8", []),
            FieldType::Bytes => Value::unnamed_variant("Bytes", []),
        }
    }
}

/// Concrete job argument or result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Uint8(u8),
    Bytes(Vec<u8>),
}

impl Field {
    fn value(&self) -> Value {
        match self {
            Field::Uint8(n) => Value::unnamed_variant("Uint8", [Value::u128(u128::from(*n))]),
            Field::Bytes(bytes) => Value::unnamed_variant("Bytes", [Value::from_bytes(bytes)]),
        }
    }
}

/// One job of a service blueprint.
#[derive(Debug, Clone)]
pub struct JobDefinition {
    pub name: String,
    pub description: String,
    pub params: Vec<FieldType>,
    pub result: Vec<FieldType>,
}

/// A service blueprint without hooks, verifiers or registration parameters.
#[derive(Debug, Clone)]
pub struct ServiceBlueprint {
    pub name: String,
    pub description: String,
    pub author: String,
    pub jobs: Vec<JobDefinition>,
}

impl ServiceBlueprint {
    /// Threshold signature service with a `keygen` job (threshold as `Uint8`)
    /// and a `sign` job (message as `Bytes`).
    pub fn threshold_signatures(author: &str) -> Self {
        Self {
            name: "CGGMP21".to_string(),
            description: "A simple Threshold Signature Scheme as a service".to_string(),
            author: author.to_string(),
            jobs: vec![
                JobDefinition {
                    name: "keygen".to_string(),
                    description: "run a new t-of-n DKG".to_string(),
                    params: vec![FieldType::Uint8],
                    result: vec![FieldType::Bytes],
                },
                JobDefinition {
                    name: "sign".to_string(),
                    description: "sign a message using a t-of-n DKG".to_string(),
                    params: vec![FieldType::Bytes],
                    result: vec![FieldType::Bytes],
                },
            ],
        }
    }

    fn value(&self) -> Value {
        let none = || Value::unnamed_variant("None", []);
        let jobs = self.jobs.iter().map(|job| {
            Value::named_composite([
                (
                    "metadata",
                    Value::named_composite([
                        ("name", Value::from_bytes(&job.name)),
                        ("description", Value::from_bytes(&job.description)),
                    ]),
                ),
                ("params", Value::unnamed_composite(job.params.iter().map(|t| t.value()))),
                ("result", Value::unnamed_composite(job.result.iter().map(|t| t.value()))),
                ("verifier", none()),
            ])
        });

        Value::named_composite([
            (
                "metadata",
                Value::named_composite([
                    ("name", Value::from_bytes(&self.name)),
                    ("description", Value::from_bytes(&self.description)),
                    ("author", Value::from_bytes(&self.author)),
                ]),
            ),
            ("jobs", Value::unnamed_composite(jobs)),
            ("registration_hook", none()),
            ("request_hook", none()),
            ("registration_params", Value::unnamed_composite([])),
            ("request_params", Value::unnamed_composite([])),
            (
                "gadget",
                Value::unnamed_variant(
                    "Wasm",
                    [Value::unnamed_variant("Ipfs", [Value::from_bytes(Vec::<u8>::new())])],
                ),
            ),
        ])
    }
}

/// `Services::create_blueprint(blueprint)`.
pub fn create_blueprint(blueprint: &ServiceBlueprint) -> DynamicPayload {
    subxt::dynamic::tx("Services", "create_blueprint", vec![blueprint.value()])
}

/// `Services::register(blueprint_id, preferences, registration_args)`.
///
/// `operator_key` is the operator's compressed ecdsa public key; approval is
/// not required.
pub fn register(blueprint_id: u64, operator_key: &[u8; 33]) -> DynamicPayload {
    let preferences = Value::named_composite([
        ("key", Value::from_bytes(operator_key)),
        ("approval", Value::unnamed_variant("None", [])),
    ]);
    subxt::dynamic::tx(
        "Services",
        "register",
        vec![
            Value::u128(u128::from(blueprint_id)),
            preferences,
            Value::unnamed_composite([]),
        ],
    )
}

/// `Services::request(blueprint_id, permitted_callers, operators, ttl, request_args)`.
pub fn request(blueprint_id: u64, operators: &[AccountId32], ttl: u64) -> DynamicPayload {
    subxt::dynamic::tx(
        "Services",
        "request",
        vec![
            Value::u128(u128::from(blueprint_id)),
            Value::unnamed_composite([]),
            Value::unnamed_composite(operators.iter().map(|op| Value::from_bytes(op.0))),
            Value::u128(u128::from(ttl)),
            Value::unnamed_composite([]),
        ],
    )
}

/// `Services::job_call(service_id, job, args)`.
pub fn job_call(service_id: u64, job: u8, args: &[Field]) -> DynamicPayload {
    subxt::dynamic::tx(
        "Services",
        "job_call",
        vec![
            Value::u128(u128::from(service_id)),
            Value::u128(u128::from(job)),
            Value::unnamed_composite(args.iter().map(Field::value)),
        ],
    )
}

/// `Services::job_submit(service_id, call_id, result)`.
pub fn job_submit(service_id: u64, call_id: u64, result: &[Field]) -> DynamicPayload {
    subxt::dynamic::tx(
        "Services",
        "job_submit",
        vec![
            Value::u128(u128::from(service_id)),
            Value::u128(u128::from(call_id)),
            Value::unnamed_composite(result.iter().map(Field::value)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_targets_balances() {
        let call = transfer_keep_alive(&AccountId32([1; 32]), 10);
        assert_eq!(call.pallet_name(), "Balances");
        assert_eq!(call.call_name(), "transfer_keep_alive");
    }

    #[test]
    fn test_remark_targets_system() {
        let call = remark_with_event(b"hello");
        assert_eq!(call.pallet_name(), "System");
        assert_eq!(call.call_name(), "remark_with_event");
    }

    #[test]
    fn test_services_calls_target_services_pallet() {
        let blueprint = ServiceBlueprint::threshold_signatures("Alice");
        let calls = [
            (create_blueprint(&blueprint), "create_blueprint"),
            (register(0, &[2; 33]), "register"),
            (request(0, &[AccountId32([7; 32])], 10_000), "request"),
            (job_call(0, 0, &[Field::Uint8(2)]), "job_call"),
            (job_submit(0, 0, &[Field::Bytes(vec![1, 2, 3])]), "job_submit"),
        ];
        for (call, name) in calls {
            assert_eq!(call.pallet_name(), "Services");
            assert_eq!(call.call_name(), name);
        }
    }

    #[test]
    fn test_threshold_blueprint_jobs() {
        let blueprint = ServiceBlueprint::threshold_signatures("Alice");
        let names: Vec<&str> = blueprint.jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["keygen", "sign"]);
        assert_eq!(blueprint.jobs[0].params, vec![FieldType::Uint8]);
        assert_eq!(blueprint.jobs[1].params, vec![FieldType::Bytes]);
    }
}
