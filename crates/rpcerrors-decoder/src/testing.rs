//! Error types and contracts shared by the unit tests.

use rpcerrors_core::{
    ApiContract, BoxError, Constructor, ErrorDetails, ErrorType, HttpVerb, MessageSetter,
    MethodSignature, ParamType, Response, Rule, ServiceError, StaticHierarchyResolver,
};
use serde::Deserialize;

macro_rules! service_error {
    ($($name:ident),* $(,)?) => {$(
        #[derive(Debug, thiserror::Error)]
        #[error("{details}")]
        pub struct $name {
            pub details: ErrorDetails,
        }

        impl ServiceError for $name {
            fn details(&self) -> &ErrorDetails {
                &self.details
            }

            fn details_mut(&mut self) -> &mut ErrorDetails {
                &mut self.details
            }
        }
    )*};
}

service_error!(
    EmptyConstructorError,
    MessageConstructorError,
    TwoMessagesConstructorError,
    CauseConstructorError,
    MessageAndCauseConstructorError,
    GenericCauseConstructorError,
    InvalidConstructorError,
    MultipleConstructorsError,
    OnlyCauseConstructorsError,
    DesignatedConstructorError,
    HardcodedMessageError,
    ConcreteQueryError,
    ConcreteSubQueryError,
    DuplicateCodeError,
    NoCodeError,
    AdditionalRuntimeError,
    UnregisteredRuntimeError,
);

pub const EMPTY_CODE: &str = "BSOD";
pub const MESSAGE_CODE: &str = "KERNEL_PANIC";
pub const TWO_MESSAGES_CODE: &str = "KERNEL_PANIC_TWICE";
pub const CAUSE_CODE: &str = "KERNEL_PANIC_ESCAPE!";
pub const MESSAGE_AND_CAUSE_CODE: &str = "PRISON_BREAK!";
pub const GENERIC_CAUSE_CODE: &str = "OOPS!";
pub const INVALID_CODE: &str = "INVALID_INPUT";
pub const MULTIPLE_CODE: &str = "SO_MANY_CONSTRUCTORS";
pub const ONLY_CAUSE_CODE: &str = "SO_MANY_CAUSES";
pub const DESIGNATED_CODE: &str = "DESIGNATED";
pub const HARDCODED_CODE: &str = "HARDCORE!!!";
pub const HARDCODED_MESSAGE: &str = "THIS IS HARDCODED!";
pub const SETTER_CODE: &str = "SETTER";
pub const QUERY_CODE: &str = "BLUE_SCREEN_OF_DEATH";
pub const SUB_QUERY_CODE: &str = "RED_SCREEN_OF_DEATH";
pub const RATE_LIMITED_CODE: &str = "RATE_LIMITED";
pub const RUNTIME_CODE: &str = "RUNTIME_BSOD?";
pub const RUNTIME_MESSAGE: &str = "PANIC";
pub const UNREGISTERED_RUNTIME_CODE: &str = "RUNTIME_UNREGISTERED";

fn details(code: &str) -> ErrorDetails {
    ErrorDetails::new(code)
}

/// Error with an explicit message setter that records its use.
#[derive(Debug, thiserror::Error)]
#[error("{details}")]
pub struct SetterError {
    pub details: ErrorDetails,
    pub set_by_setter: bool,
}

impl ServiceError for SetterError {
    fn details(&self) -> &ErrorDetails {
        &self.details
    }

    fn details_mut(&mut self) -> &mut ErrorDetails {
        &mut self.details
    }

    fn as_message_setter(&mut self) -> Option<&mut dyn MessageSetter> {
        Some(self)
    }
}

impl MessageSetter for SetterError {
    fn set_error_message(&mut self, message: String) {
        *self.details.message_slot() = Some(message);
        self.set_by_setter = true;
    }
}

/// Error carrying extra wire fields, rebuilt in multi-field mode.
#[derive(Debug, Deserialize, thiserror::Error)]
#[error("{details} (retry after {retry_after_secs}s)")]
#[serde(rename_all = "camelCase")]
pub struct RateLimitedError {
    #[serde(flatten)]
    pub details: ErrorDetails,
    #[serde(default)]
    pub retry_after_secs: u64,
}

impl ServiceError for RateLimitedError {
    fn details(&self) -> &ErrorDetails {
        &self.details
    }

    fn details_mut(&mut self) -> &mut ErrorDetails {
        &mut self.details
    }
}

// ─── Type handles ─────────────────────────────────────────────────────────────

pub fn base_service_error() -> ErrorType {
    ErrorType::abstract_type("rpcerrors_decoder::testing::BaseServiceError").build()
}

pub fn abstract_service_error() -> ErrorType {
    ErrorType::abstract_type("rpcerrors_decoder::testing::AbstractQueryError")
        .extends(&base_service_error())
        .build()
}

pub fn abstract_sub_service_error() -> ErrorType {
    ErrorType::abstract_type("rpcerrors_decoder::testing::AbstractSubQueryError")
        .extends(&abstract_service_error())
        .build()
}

pub fn empty_constructor_error() -> ErrorType {
    ErrorType::concrete::<EmptyConstructorError>()
        .extends(&base_service_error())
        .constructor(Constructor::empty(|| EmptyConstructorError {
            details: details(EMPTY_CODE),
        }))
        .build()
}

pub fn message_constructor_error() -> ErrorType {
    ErrorType::concrete::<MessageConstructorError>()
        .extends(&base_service_error())
        .constructor(Constructor::message(|_: String| MessageConstructorError {
            details: details(MESSAGE_CODE),
        }))
        .build()
}

pub fn two_messages_constructor_error() -> ErrorType {
    ErrorType::concrete::<TwoMessagesConstructorError>()
        .extends(&base_service_error())
        .constructor(Constructor::two_messages(|_: String, _: String| {
            TwoMessagesConstructorError {
                details: details(TWO_MESSAGES_CODE),
            }
        }))
        .build()
}

pub fn cause_constructor_error() -> ErrorType {
    ErrorType::concrete::<CauseConstructorError>()
        .extends(&base_service_error())
        .constructor(Constructor::cause(|_: BoxError| CauseConstructorError {
            details: details(CAUSE_CODE),
        }))
        .build()
}

pub fn message_and_cause_constructor_error() -> ErrorType {
    ErrorType::concrete::<MessageAndCauseConstructorError>()
        .extends(&base_service_error())
        .constructor(Constructor::message_and_cause(|m: String, c: BoxError| {
            MessageAndCauseConstructorError {
                details: details(MESSAGE_AND_CAUSE_CODE).with_message(m).with_cause(c),
            }
        }))
        .build()
}

pub fn generic_cause_constructor_error() -> ErrorType {
    ErrorType::concrete::<GenericCauseConstructorError>()
        .extends(&base_service_error())
        .constructor(Constructor::generic_cause(|c: anyhow::Error| {
            GenericCauseConstructorError {
                details: details(GENERIC_CAUSE_CODE).with_cause(c),
            }
        }))
        .build()
}

pub fn invalid_constructor_error() -> ErrorType {
    ErrorType::concrete::<InvalidConstructorError>()
        .extends(&base_service_error())
        .constructor(Constructor::with_params(
            &[ParamType::Other("i32"), ParamType::Cause, ParamType::Message],
            |_| {
                Ok(InvalidConstructorError {
                    details: details(INVALID_CODE),
                })
            },
        ))
        .build()
}

pub fn multiple_constructors_error() -> ErrorType {
    ErrorType::concrete::<MultipleConstructorsError>()
        .extends(&base_service_error())
        .constructor(Constructor::cause(|c: BoxError| MultipleConstructorsError {
            details: details(MULTIPLE_CODE).with_cause(c),
        }))
        .constructor(Constructor::message_and_cause(|m: String, c: BoxError| {
            MultipleConstructorsError {
                details: details(MULTIPLE_CODE).with_message(m).with_cause(c),
            }
        }))
        .constructor(Constructor::message(|m: String| MultipleConstructorsError {
            details: details(MULTIPLE_CODE).with_message(m),
        }))
        .build()
}

pub fn only_cause_constructors_error() -> ErrorType {
    ErrorType::concrete::<OnlyCauseConstructorsError>()
        .extends(&base_service_error())
        .constructor(Constructor::cause(|c: BoxError| OnlyCauseConstructorsError {
            details: details(ONLY_CAUSE_CODE).with_cause(c),
        }))
        .constructor(Constructor::message_and_cause(|m: String, c: BoxError| {
            OnlyCauseConstructorsError {
                details: details(ONLY_CAUSE_CODE).with_message(m).with_cause(c),
            }
        }))
        .build()
}

pub fn designated_constructor_error() -> ErrorType {
    ErrorType::concrete::<DesignatedConstructorError>()
        .extends(&base_service_error())
        .constructor(Constructor::empty(|| DesignatedConstructorError {
            details: details(DESIGNATED_CODE),
        }))
        .designated(Constructor::two_messages(|_: String, _: String| {
            DesignatedConstructorError {
                details: details(DESIGNATED_CODE),
            }
        }))
        .build()
}

pub fn hardcoded_message_error() -> ErrorType {
    ErrorType::concrete::<HardcodedMessageError>()
        .extends(&base_service_error())
        .constructor(Constructor::empty(|| HardcodedMessageError {
            details: details(HARDCODED_CODE).with_message(HARDCODED_MESSAGE),
        }))
        .build()
}

pub fn setter_error() -> ErrorType {
    ErrorType::concrete::<SetterError>()
        .extends(&base_service_error())
        .constructor(Constructor::empty(|| SetterError {
            details: details(SETTER_CODE),
            set_by_setter: false,
        }))
        .build()
}

pub fn rate_limited_error() -> ErrorType {
    ErrorType::concrete::<RateLimitedError>()
        .extends(&base_service_error())
        .constructor(Constructor::empty(|| RateLimitedError {
            details: details(RATE_LIMITED_CODE),
            retry_after_secs: 0,
        }))
        .deserializable()
        .build()
}

pub fn concrete_query_error() -> ErrorType {
    ErrorType::concrete::<ConcreteQueryError>()
        .extends(&abstract_service_error())
        .constructor(Constructor::message(|m: String| ConcreteQueryError {
            details: details(QUERY_CODE).with_message(m),
        }))
        .build()
}

pub fn concrete_sub_query_error() -> ErrorType {
    ErrorType::concrete::<ConcreteSubQueryError>()
        .extends(&abstract_sub_service_error())
        .constructor(Constructor::empty(|| ConcreteSubQueryError {
            details: details(SUB_QUERY_CODE),
        }))
        .build()
}

pub fn duplicate_code_error() -> ErrorType {
    ErrorType::concrete::<DuplicateCodeError>()
        .extends(&base_service_error())
        .constructor(Constructor::empty(|| DuplicateCodeError {
            details: details(SUB_QUERY_CODE),
        }))
        .build()
}

pub fn no_code_error() -> ErrorType {
    ErrorType::concrete::<NoCodeError>()
        .extends(&base_service_error())
        .constructor(Constructor::empty(|| NoCodeError { details: details("") }))
        .build()
}

pub fn additional_runtime_error() -> ErrorType {
    ErrorType::concrete::<AdditionalRuntimeError>()
        .constructor(Constructor::empty(|| AdditionalRuntimeError {
            details: details(RUNTIME_CODE).with_message(RUNTIME_MESSAGE),
        }))
        .build()
}

pub fn unregistered_runtime_error() -> ErrorType {
    ErrorType::concrete::<UnregisteredRuntimeError>()
        .constructor(Constructor::empty(|| UnregisteredRuntimeError {
            details: details(UNREGISTERED_RUNTIME_CODE),
        }))
        .build()
}

/// Every known type, as a build-time registry would list them.
pub fn resolver() -> StaticHierarchyResolver {
    [
        base_service_error(),
        abstract_service_error(),
        abstract_sub_service_error(),
        concrete_query_error(),
        concrete_sub_query_error(),
        empty_constructor_error(),
    ]
    .into_iter()
    .collect()
}

// ─── Contracts ────────────────────────────────────────────────────────────────

fn remote(name: &str) -> MethodSignature {
    MethodSignature::new(name).rule(Rule::request_line("GET /"))
}

pub fn plain_contract() -> ApiContract {
    ApiContract::new("TestApiWithPlainErrors")
        .method(remote("empty").throws(empty_constructor_error()))
        .method(remote("message").throws(message_constructor_error()))
        .method(remote("twoMessages").throws(two_messages_constructor_error()))
        .method(remote("cause").throws(cause_constructor_error()))
        .method(remote("messageAndCause").throws(message_and_cause_constructor_error()))
        .method(remote("messageAndCauseAgain").throws(message_and_cause_constructor_error()))
        .method(
            MethodSignature::new("mapped")
                .rule(Rule::mapping(Some(HttpVerb::Get), "/mapped"))
                .throws(generic_cause_constructor_error()),
        )
        .method(remote("hardcoded").throws(hardcoded_message_error()))
        .method(remote("setter").throws(setter_error()))
        .method(remote("rateLimited").throws(rate_limited_error()))
}

pub fn inherited_contract() -> ApiContract {
    ApiContract::new("TestApiWithInheritedErrors")
        .method(remote("query").throws(abstract_service_error()))
}

pub fn response(code: &str, message: &str) -> Response {
    let body = serde_json::json!({ "errorCode": code, "message": message });
    Response::new(400).with_body(body.to_string())
}
