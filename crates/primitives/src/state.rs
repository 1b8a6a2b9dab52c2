use crate::doc::Doc;
use crate::selection::Selection;
use crate::transaction::Transaction;

/// A document together with its selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocState {
	pub doc: Doc,
	pub selection: Selection,
}

impl DocState {
	pub fn new(doc: Doc) -> Self {
		Self {
			doc,
			selection: Selection::default(),
		}
	}

	pub fn with_selection(mut self, selection: Selection) -> Self {
		self.selection = selection.clamp(self.doc.len());
		self
	}

	/// Starts a transaction on this state.
	pub fn tr(&self) -> Transaction {
		Transaction::new(self.doc.clone(), self.selection)
	}

	/// Returns the state after `tr`.
	pub fn apply(&self, tr: &Transaction) -> DocState {
		DocState {
			doc: tr.doc().clone(),
			selection: tr.selection(),
		}
	}
}
