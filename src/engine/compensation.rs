// ==========================================
// 设备维保管理系统 - 补偿动作日志
// ==========================================
// 职责: 记录每一步已生效库存变化的逆操作，失败时倒序执行
// 红线: 只记录真正生效的变化（空操作的返还不记录）
// ==========================================

use crate::domain::action_log::StockDelta;

/// 单个补偿动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensationAction {
    /// 撤销一次扣减
    Release { stock_id: String, quantity: i64 },
    /// 撤销一次返还
    Reserve { stock_id: String, quantity: i64 },
}

impl CompensationAction {
    /// 原操作对库存的变化量（补偿动作的相反数）
    fn applied_delta(&self) -> StockDelta {
        match self {
            CompensationAction::Release { stock_id, quantity } => StockDelta {
                stock_id: stock_id.clone(),
                delta: -quantity,
            },
            CompensationAction::Reserve { stock_id, quantity } => StockDelta {
                stock_id: stock_id.clone(),
                delta: *quantity,
            },
        }
    }
}

/// 补偿日志
///
/// 扣减成功后 `record(Release)`，返还成功后 `record(Reserve)`；
/// 失败时 `drain_reversed()` 按倒序取出待执行的补偿动作
#[derive(Debug, Default)]
pub struct CompensationLog {
    actions: Vec<CompensationAction>,
}

impl CompensationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: CompensationAction) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// 倒序取出全部补偿动作
    pub fn drain_reversed(&mut self) -> Vec<CompensationAction> {
        let mut actions = std::mem::take(&mut self.actions);
        actions.reverse();
        actions
    }

    /// 已生效变化的按备件汇总（审计用）
    ///
    /// 按首次出现的顺序输出，净变化为 0 的备件也保留
    pub fn net_deltas(&self) -> Vec<StockDelta> {
        let mut net: Vec<StockDelta> = Vec::new();
        for action in &self.actions {
            let applied = action.applied_delta();
            match net.iter_mut().find(|d| d.stock_id == applied.stock_id) {
                Some(existing) => existing.delta += applied.delta,
                None => net.push(applied),
            }
        }
        net
    }
}
