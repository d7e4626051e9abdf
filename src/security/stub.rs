use crate::binder::form;
use crate::dispatcher::Exchange;
use crate::environment::{Environment, RestEnv};
use crate::error::HandlerError;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Scheme word of stub credentials, including the trailing space.
pub const STUB_SCHEME: &str = "Stub ";

/// Turns an `Authorization` header value into an identity.
pub trait CredentialParser: Default + Send + 'static {
    type Identity: Default + Send + 'static;

    /// # Errors
    ///
    /// A [`HandlerError`] to reply with, typically [`bad_token`].
    fn parse(&self, authorization: &str) -> Result<Self::Identity, HandlerError>;
}

/// The `401 bad token` reply.
#[must_use]
pub fn bad_token() -> HandlerError {
    HandlerError::status(401, "bad token")
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(with = "form::text")]
    pub uid: u32,
    #[serde(rename = "ut", with = "form::text")]
    pub utype: u32,
    #[serde(
        rename = "app",
        with = "form::text",
        default,
        skip_serializing_if = "is_zero_u64"
    )]
    pub appid: u64,
    #[serde(rename = "ak", default, skip_serializing_if = "String::is_empty")]
    pub access: String,
    #[serde(rename = "eu", default, skip_serializing_if = "String::is_empty")]
    pub end_user: String,
}

/// A user, possibly acting on behalf of a sudoer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudoerInfo {
    #[serde(flatten)]
    pub user: UserInfo,
    #[serde(rename = "suid", default, skip_serializing_if = "is_zero_u32")]
    pub sudoer: u32,
    #[serde(rename = "sut", default, skip_serializing_if = "is_zero_u32")]
    pub utype_su: u32,
}

impl Deref for SudoerInfo {
    type Target = UserInfo;

    fn deref(&self) -> &UserInfo {
        &self.user
    }
}

impl DerefMut for SudoerInfo {
    fn deref_mut(&mut self) -> &mut UserInfo {
        &mut self.user
    }
}

/// Parser and formatter for `Stub` credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubTokenParser;

impl StubTokenParser {
    /// Full header value, scheme included.
    #[must_use]
    pub fn format(user: &SudoerInfo) -> String {
        format!("{STUB_SCHEME}{}", Self::format_token(user))
    }

    /// Token without the scheme. Zero and empty fields are left out, and
    /// `sut` only appears together with `suid`.
    #[must_use]
    pub fn format_token(user: &SudoerInfo) -> String {
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        out.append_pair("uid", &user.uid.to_string());
        out.append_pair("ut", &user.utype.to_string());
        if user.appid != 0 {
            out.append_pair("app", &user.appid.to_string());
        }
        if user.sudoer != 0 {
            out.append_pair("suid", &user.sudoer.to_string());
            if user.utype_su != 0 {
                out.append_pair("sut", &user.utype_su.to_string());
            }
        }
        if !user.access.is_empty() {
            out.append_pair("ak", &user.access);
        }
        if !user.end_user.is_empty() {
            out.append_pair("eu", &user.end_user);
        }
        out.finish()
    }

    /// Parse a token without the scheme.
    ///
    /// # Errors
    ///
    /// [`bad_token`] when a required field is missing or a number is invalid.
    pub fn parse_token(token: &str) -> Result<SudoerInfo, HandlerError> {
        form::from_str::<SudoerInfo>(token).map_err(|err| {
            debug!(error = %err, "Stub token rejected");
            bad_token()
        })
    }
}

impl CredentialParser for StubTokenParser {
    type Identity = SudoerInfo;

    fn parse(&self, authorization: &str) -> Result<SudoerInfo, HandlerError> {
        let token = authorization.strip_prefix(STUB_SCHEME).ok_or_else(|| {
            debug!("Authorization header is not a stub credential");
            bad_token()
        })?;
        Self::parse_token(token)
    }
}

/// [`RestEnv`] plus the authenticated caller.
pub struct AuthEnv<P: CredentialParser = StubTokenParser> {
    pub rest: RestEnv,
    pub user: P::Identity,
    parser: PhantomData<fn() -> P>,
}

impl<P: CredentialParser> Default for AuthEnv<P> {
    fn default() -> Self {
        Self {
            rest: RestEnv::default(),
            user: P::Identity::default(),
            parser: PhantomData,
        }
    }
}

impl<P: CredentialParser> std::fmt::Debug for AuthEnv<P>
where
    P::Identity: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEnv")
            .field("rest", &self.rest)
            .field("user", &self.user)
            .finish()
    }
}

impl<P: CredentialParser> Deref for AuthEnv<P> {
    type Target = RestEnv;

    fn deref(&self) -> &RestEnv {
        &self.rest
    }
}

impl<S, P: CredentialParser> Environment<S> for AuthEnv<P> {
    fn open(&mut self, svc: &S, ex: &Exchange) -> Result<(), HandlerError> {
        self.rest.open(svc, ex)?;
        let authorization = ex.head().header("authorization").ok_or_else(|| {
            debug!(request_id = %ex.request_id(), "Missing Authorization header");
            bad_token()
        })?;
        self.user = P::default().parse(authorization)?;
        Ok(())
    }
}
