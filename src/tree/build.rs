use bytes::BytesMut;

use crate::codec::encode::write_frame;
use crate::codec::Encode;
use crate::tree::TlvNode;

impl TlvNode {
    /// Serializes every struct value in this subtree from its children, bottom-up.
    ///
    /// Setters only attach children; this pass is what makes `value()` and
    /// `to_bytes()` reflect them. Primitive nodes are left as they are.
    pub fn build(&mut self) -> &mut Self {
        if !self.is_struct() {
            return self;
        }

        for child in &mut self.children {
            child.build();
        }

        let value_len: usize = self.children.iter().map(|child| child.frame.encoded_len()).sum();
        let mut value = BytesMut::with_capacity(value_len);
        for child in &self.children {
            write_frame(&child.frame, &mut value);
        }
        self.frame.value = value.freeze();
        self
    }
}
