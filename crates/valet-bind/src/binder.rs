//! Record binding.
//!
//! [`Binder`] builds a target record field by field: resolve the raw value,
//! fall back to the declared default, enforce `required`, then coerce and
//! store. The first failing field ends the bind.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::coerce::coerce;
use crate::plan::FieldBinding;
use crate::source::{BindState, RawValue, SourceResolver};
use crate::{body, Bind, BindError, BindPlan, FieldError, PatternCache, RequestContext};

/// Binds request data into target records.
///
/// A binder holds no per-request state and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use valet_bind::{Binder, BindPlan, RequestContext};
///
/// #[derive(Debug, Default)]
/// struct Person {
///     age: u8,
/// }
///
/// let plan = BindPlan::new()
///     .field("age", r#"from:"query" min:"0" max:"130""#, |p: &mut Person| &mut p.age);
///
/// let ctx = RequestContext::builder()
///     .uri("/people?age=200".parse().unwrap())
///     .build();
///
/// let err = Binder::new().bind_with(&ctx, &plan).unwrap_err();
/// let field = err.field_error().unwrap();
/// assert_eq!(field.name(), "age");
/// assert_eq!(field.message(), "value is above maximum 130");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Binder {
    resolver: SourceResolver,
}

impl Binder {
    /// Creates a binder with an unbounded pattern cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a binder around an existing resolver.
    #[must_use]
    pub fn with_resolver(resolver: SourceResolver) -> Self {
        Self { resolver }
    }

    /// Creates a binder using the given pattern cache.
    #[must_use]
    pub fn with_pattern_cache(patterns: Arc<PatternCache>) -> Self {
        Self::with_resolver(SourceResolver::with_patterns(patterns))
    }

    /// Returns the source resolver.
    #[must_use]
    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    /// Binds a record using its own plan.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindError`] encountered.
    pub fn bind<T: Bind>(&self, ctx: &RequestContext) -> Result<T, BindError> {
        self.bind_with(ctx, T::plan())
    }

    /// Binds a record using an explicit plan.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindError`] encountered.
    pub fn bind_with<T: Default>(
        &self,
        ctx: &RequestContext,
        plan: &BindPlan<T>,
    ) -> Result<T, BindError> {
        let mut target = T::default();
        let mut state = BindState::new();

        for binding in plan.fields() {
            if let Err(e) = self.fill_field(&mut target, binding, ctx, &mut state) {
                debug!(field = binding.field_name(), error = %e, "bind failed");
                return Err(e);
            }
        }

        Ok(target)
    }

    fn fill_field<T>(
        &self,
        target: &mut T,
        binding: &FieldBinding<T>,
        ctx: &RequestContext,
        state: &mut BindState,
    ) -> Result<(), BindError> {
        let meta = binding.metadata();

        let (text, is_default) = match self.resolver.resolve(meta, ctx, state)? {
            RawValue::Body(raw) => return body::apply(binding, target, &raw, ctx),
            RawValue::Text(text) => (text, false),
            RawValue::NotFound => match &meta.default {
                Some(default) => (default.clone(), true),
                None if meta.required => return Err(FieldError::required(&meta.name).into()),
                None => {
                    trace!(field = binding.field_name(), source = %meta.source, "no value");
                    return Ok(());
                }
            },
        };

        let value = coerce(meta, binding.shape(), binding.type_name(), &text, is_default)?;
        binding
            .assign(target, value)
            .map_err(|msg| FieldError::invalid(&meta.name, &text, msg))?;

        trace!(
            field = binding.field_name(),
            source = %meta.source,
            is_default,
            "field bound"
        );
        Ok(())
    }
}
