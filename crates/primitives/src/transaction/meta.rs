use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;

/// Typed key for a value stored in transaction metadata.
///
/// Keys are compared by name, so every key must use a unique name. Plugins
/// declare their keys as constants:
///
/// ```
/// use redline_primitives::MetaKey;
///
/// struct Origin(&'static str);
/// const ORIGIN: MetaKey<Origin> = MetaKey::new("origin");
/// ```
pub struct MetaKey<T> {
	name: &'static str,
	_marker: PhantomData<fn() -> T>,
}

impl<T> MetaKey<T> {
	pub const fn new(name: &'static str) -> Self {
		Self {
			name,
			_marker: PhantomData,
		}
	}

	pub const fn name(&self) -> &'static str {
		self.name
	}
}

impl<T> Clone for MetaKey<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for MetaKey<T> {}

impl<T> fmt::Debug for MetaKey<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("MetaKey").field(&self.name).finish()
	}
}

/// Heterogeneous metadata attached to a transaction.
#[derive(Default)]
pub struct Meta {
	values: FxHashMap<&'static str, Box<dyn Any>>,
}

impl Meta {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `value` under `key`, replacing any previous value.
	pub fn insert<T: 'static>(&mut self, key: MetaKey<T>, value: T) {
		self.values.insert(key.name, Box::new(value));
	}

	pub fn get<T: 'static>(&self, key: MetaKey<T>) -> Option<&T> {
		self.values.get(key.name)?.downcast_ref()
	}

	pub fn contains<T: 'static>(&self, key: MetaKey<T>) -> bool {
		self.get(key).is_some()
	}

	pub fn remove<T: 'static>(&mut self, key: MetaKey<T>) -> Option<T> {
		let value = self.values.remove(key.name)?;
		value.downcast().ok().map(|boxed| *boxed)
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl fmt::Debug for Meta {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.values.keys()).finish()
	}
}
