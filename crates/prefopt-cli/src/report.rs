//! Human-readable walkthrough of a single DPO loss evaluation.

use std::fmt;

use prefopt_core::{DpoBreakdown, PreferenceLogProbs};

const RULE_WIDTH: usize = 60;

/// Step-by-step report for one preference pair.
#[derive(Debug, Clone, Copy)]
pub struct ExampleReport {
    sample: PreferenceLogProbs,
    breakdown: DpoBreakdown,
}

impl ExampleReport {
    /// Build a report from inputs and their evaluated breakdown.
    pub fn new(sample: PreferenceLogProbs, breakdown: DpoBreakdown) -> Self {
        Self { sample, breakdown }
    }
}

impl fmt::Display for ExampleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let s = &self.sample;
        let b = &self.breakdown;

        writeln!(f, "DPO LOSS CALCULATION EXAMPLE")?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;

        if s.policy_rejected > s.policy_chosen {
            writeln!(f, "Scenario: the policy assigns more probability to the REJECTED response")?;
            writeln!(
                f,
                "(policy log prob rejected = {:.2} is higher than chosen = {:.2})",
                s.policy_rejected, s.policy_chosen
            )?;
        } else {
            writeln!(f, "Scenario: the policy assigns at least as much probability to the CHOSEN response")?;
            writeln!(
                f,
                "(policy log prob chosen = {:.2}, rejected = {:.2})",
                s.policy_chosen, s.policy_rejected
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Inputs:")?;
        writeln!(f, "  Beta:                            {:.2}", b.beta)?;
        writeln!(f, "  Policy LogProb (Chosen):         {:.2}", s.policy_chosen)?;
        writeln!(f, "  Reference LogProb (Chosen):      {:.2}", s.ref_chosen)?;
        writeln!(f, "  Policy LogProb (Rejected):       {:.2}", s.policy_rejected)?;
        writeln!(f, "  Reference LogProb (Rejected):    {:.2}", s.ref_rejected)?;
        writeln!(f)?;
        writeln!(f, "Calculated DPO Loss: {:.4}", b.loss)?;

        writeln!(f)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "INTERPRETATION:")?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;
        writeln!(f, "1. Policy's relative preference for CHOSEN:   {:.2}", b.policy_chosen_ratio)?;
        writeln!(f, "2. Policy's relative preference for REJECTED: {:.2}", b.policy_rejected_ratio)?;
        writeln!(f, "3. Preference difference:                     {:.2}", b.preference_diff)?;
        writeln!(f)?;

        if b.prefers_rejected() {
            writeln!(f, "   NEGATIVE DIFFERENCE: policy prefers REJECTED over chosen")?;
            writeln!(f, "   => high loss pushes the model toward the chosen response")?;
        } else {
            writeln!(f, "   NON-NEGATIVE DIFFERENCE: policy prefers CHOSEN over rejected")?;
            writeln!(f, "   => low loss indicates good alignment")?;
        }

        writeln!(f)?;
        writeln!(f, "4. Scaled by beta ({:.2}):                     {:.2}", b.beta, b.scaled_diff)?;
        writeln!(f, "5. After sigmoid:                             {:.4}", b.alignment_prob)?;
        writeln!(f, "6. Final loss (-ln of above):                 {:.4}", b.loss)?;
        writeln!(f)?;
        writeln!(f, "Minimising this loss raises the policy log prob of the chosen response")?;
        writeln!(f, "and lowers that of the rejected one, relative to the reference model.")?;
        write!(f, "{rule}")
    }
}
