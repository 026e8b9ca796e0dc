use crate::ir::op::Op;

/// Stack of open blocks. Ops are always appended to the innermost block;
/// control-flow lowering opens a block per region and closes it once the
/// region's ops are complete.
#[derive(Debug)]
pub struct OpBuilder {
    blocks: Vec<Vec<Op>>,
}

impl Default for OpBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpBuilder {
    /// A builder with the top-level block already open.
    pub fn new() -> Self {
        OpBuilder {
            blocks: vec![Vec::new()],
        }
    }

    pub fn push_block(&mut self) {
        self.blocks.push(Vec::new());
    }

    pub fn pop_block(&mut self) -> Vec<Op> {
        self.blocks.pop().unwrap_or_default()
    }

    pub fn emit_op(&mut self, op: Op) {
        if self.blocks.is_empty() {
            self.blocks.push(Vec::new());
        }
        if let Some(block) = self.blocks.last_mut() {
            block.push(op);
        }
    }

    pub fn last_op_mut(&mut self) -> Option<&mut Op> {
        self.blocks.last_mut().and_then(|block| block.last_mut())
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    /// Drains every remaining block into one list, outermost first.
    pub fn finish(mut self) -> Vec<Op> {
        let mut ops = Vec::new();
        for block in self.blocks.drain(..) {
            ops.extend(block);
        }
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::op::OpKind;

    #[test]
    fn ops_go_to_the_innermost_block() {
        let mut builder = OpBuilder::new();
        builder.emit_op(Op::new(OpKind::Yield, vec![], vec![]));
        builder.push_block();
        builder.emit_op(Op::new(OpKind::Return, vec![], vec![]));
        let inner = builder.pop_block();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].kind, OpKind::Return);
        let outer = builder.finish();
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].kind, OpKind::Yield);
    }
}
