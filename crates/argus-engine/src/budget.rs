use argus_core::plan::AuditTask;

/// Partition a wave's priority-sorted tasks into admitted and skipped under
/// a run-cumulative token budget.
///
/// Walks tasks in order: a task whose estimate would push the running total
/// over the budget is skipped and not charged; the walk continues, so a
/// later, smaller task can still be admitted. With no budget every task is
/// admitted.
pub fn filter_admitted<'a>(
    tasks: &'a [AuditTask],
    budget: Option<u64>,
    spent: &mut u64,
) -> (Vec<&'a AuditTask>, Vec<&'a AuditTask>) {
    let Some(budget) = budget else {
        return (tasks.iter().collect(), Vec::new());
    };

    let mut admitted = Vec::new();
    let mut skipped = Vec::new();
    for task in tasks {
        if *spent + task.estimated_tokens > budget {
            skipped.push(task);
        } else {
            *spent += task.estimated_tokens;
            admitted.push(task);
        }
    }
    (admitted, skipped)
}
