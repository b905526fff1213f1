//! Binding plans.
//!
//! A [`BindPlan`] is the per-type field descriptor table: for each field of
//! a target record, its parsed metadata, its shape and a way to store a
//! value into it. Plans are built once per type and reused for every bind.

use std::fmt;

use crate::field::{BindField, Shape, Value};
use crate::{ContentFormat, DecodeError, FieldMetadata};

type AssignFn<T> = Box<dyn Fn(&mut T, Value) -> Result<(), String> + Send + Sync>;
type DecodeFn<T> = Box<dyn Fn(&mut T, &[u8], ContentFormat) -> Result<(), DecodeError> + Send + Sync>;

/// How one field of `T` is bound.
pub struct FieldBinding<T> {
    field_name: &'static str,
    metadata: FieldMetadata,
    shape: Shape,
    type_name: &'static str,
    assign: AssignFn<T>,
    decode: DecodeFn<T>,
}

impl<T> FieldBinding<T> {
    /// Returns the Rust field name.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        self.field_name
    }

    /// Returns the parsed metadata.
    #[must_use]
    pub fn metadata(&self) -> &FieldMetadata {
        &self.metadata
    }

    /// Returns the field's shape.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns the field type's name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn assign(&self, target: &mut T, value: Value) -> Result<(), String> {
        (self.assign)(target, value)
    }

    pub(crate) fn decode(
        &self,
        target: &mut T,
        raw: &[u8],
        format: ContentFormat,
    ) -> Result<(), DecodeError> {
        (self.decode)(target, raw, format)
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("field_name", &self.field_name)
            .field("metadata", &self.metadata)
            .field("shape", &self.shape)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Ordered field bindings for a target record type.
///
/// # Example
///
/// ```rust
/// use valet_bind::{BindPlan, Binder, RequestContext};
///
/// #[derive(Debug, Default)]
/// struct Search {
///     term: String,
///     limit: u32,
/// }
///
/// let plan = BindPlan::new()
///     .field("term", r#"name:"q" from:"query" required"#, |s: &mut Search| &mut s.term)
///     .field("limit", r#"from:"query" default:"20" max:"100""#, |s: &mut Search| &mut s.limit);
///
/// let ctx = RequestContext::builder()
///     .uri("/search?q=rust".parse().unwrap())
///     .build();
///
/// let search = Binder::new().bind_with(&ctx, &plan).unwrap();
/// assert_eq!(search.term, "rust");
/// assert_eq!(search.limit, 20);
/// ```
pub struct BindPlan<T> {
    fields: Vec<FieldBinding<T>>,
}

impl<T: 'static> BindPlan<T> {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a field.
    ///
    /// `annotation` uses the struct-tag syntax described in
    /// [`FieldMetadata`]. When it declares no name, `field_name` is used.
    #[must_use]
    pub fn field<F: BindField>(
        mut self,
        field_name: &'static str,
        annotation: &str,
        slot: fn(&mut T) -> &mut F,
    ) -> Self {
        self.fields.push(FieldBinding {
            field_name,
            metadata: FieldMetadata::parse_for_field(field_name, annotation),
            shape: F::SHAPE,
            type_name: F::type_name(),
            assign: Box::new(move |target, value| {
                *slot(target) = F::from_value(value)?;
                Ok(())
            }),
            decode: Box::new(move |target, raw, format| {
                *slot(target) = F::decode_record(raw, format)?;
                Ok(())
            }),
        });
        self
    }
}

impl<T> BindPlan<T> {
    /// Returns the field bindings in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldBinding<T>] {
        &self.fields
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the plan binds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T: 'static> Default for BindPlan<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BindPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindPlan")
            .field("fields", &self.fields)
            .finish()
    }
}

/// A record type that can be bound from a request.
///
/// Usually derived with `#[derive(Bind)]`; implementing it by hand means
/// returning a plan built once:
///
/// ```rust
/// use std::sync::OnceLock;
/// use valet_bind::{Bind, BindPlan};
///
/// #[derive(Default)]
/// struct GetUser {
///     id: u64,
/// }
///
/// impl Bind for GetUser {
///     fn plan() -> &'static BindPlan<Self> {
///         static PLAN: OnceLock<BindPlan<GetUser>> = OnceLock::new();
///         PLAN.get_or_init(|| BindPlan::new().field("id", r#"required"#, |r: &mut GetUser| &mut r.id))
///     }
/// }
/// ```
pub trait Bind: Default + Sized + 'static {
    /// Returns the binding plan for this type.
    fn plan() -> &'static BindPlan<Self>;
}
