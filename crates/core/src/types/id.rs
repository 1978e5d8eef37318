//! Typed integer keys.
//!
//! Every table uses a `SERIAL` primary key. Wrapping each in its own type
//! keeps a `ProductId` from being passed where a `ComboId` is expected, which
//! matters most for cart lines that can point at either.

/// Declare one or more `i32`-backed ID newtypes.
///
/// Each type serializes as a bare number, displays as one, converts to and
/// from `i32`, and (with the `postgres` feature) binds as `INTEGER`.
///
/// ```rust
/// # use larder_core::define_id;
/// define_id!(ShelfId, JarId);
///
/// let jar = JarId::new(3);
/// assert_eq!(jar.as_i32(), 3);
/// // let _: ShelfId = jar; // mismatched types
/// ```
#[macro_export]
macro_rules! define_id {
    ($($name:ident),+ $(,)?) => {$(
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type), sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::convert::From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl ::core::convert::From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    )+};
}

define_id!(
    CustomerId,
    AddressId,
    CategoryId,
    ProductId,
    ComboId,
    OrderId,
    OrderItemId,
    AdminUserId,
    BannerId,
    PostId,
);
