use crate::internal::error::Result;
use crate::tree::TlvNode;

/// Receives every top-level frame a `StreamDecoder` completes, in stream order.
pub trait FrameSink {
    /// Called once per decoded frame. An error is returned from `feed` unchanged.
    fn on_frame(&mut self, node: TlvNode) -> Result<()>;
}

/// Collects frames.
impl FrameSink for Vec<TlvNode> {
    fn on_frame(&mut self, node: TlvNode) -> Result<()> {
        self.push(node);
        Ok(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn on_frame(&mut self, node: TlvNode) -> Result<()> {
        (**self).on_frame(node)
    }
}

/// Adapts a closure into a `FrameSink`.
#[derive(Debug, Clone)]
pub struct FnSink<F>(pub F);

impl<F> FrameSink for FnSink<F>
where
    F: FnMut(TlvNode) -> Result<()>,
{
    fn on_frame(&mut self, node: TlvNode) -> Result<()> {
        (self.0)(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::error::Error;

    #[test]
    fn test_vec_sink_collects() {
        let mut frames: Vec<TlvNode> = Vec::new();
        frames.on_frame(TlvNode::new(1)).unwrap();
        (&mut frames).on_frame(TlvNode::new(2)).unwrap();
        assert_eq!(frames.iter().map(TlvNode::tag).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_fn_sink() {
        let mut seen = 0;
        let mut sink = FnSink(|node: TlvNode| {
            if node.tag() == 0 {
                return Err(Error::Sink("tag 0 rejected".to_string()));
            }
            seen += 1;
            Ok(())
        });
        assert!(sink.on_frame(TlvNode::new(5)).is_ok());
        assert!(matches!(sink.on_frame(TlvNode::new(0)), Err(Error::Sink(_))));
        drop(sink);
        assert_eq!(seen, 1);
    }
}
