//! Stage 6: model-as-judge for abstractive claims, batched.
//!
//! Claims are queued and flushed `batch_size` at a time, one model call per
//! batch. Callers see a synchronous submit/finish contract; a failed or
//! unparseable batch makes its claims `unverifiable`.

use docweave_core::models::{ChatMessage, ChatRequest, CitationVerdict, ClaimType, Severity};
use docweave_core::traits::ILanguageModel;
use docweave_llm::extract_json_array;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const JUDGE_SYSTEM_PROMPT: &str = "You verify documentation claims against the source code they cite.
For each item decide whether the cited code supports the claim. A claim is supported when the code shows what the claim states or directly implies it. Interpretation is allowed; invention is not.
Reply with ONLY a JSON array, one object per item: {\"id\": <item id>, \"supported\": true|false, \"reason\": \"<one sentence>\"}.";

/// Spans longer than this are truncated in the judge prompt.
const MAX_SPAN_CHARS: usize = 4_000;

#[derive(Debug, Clone, Serialize)]
struct PendingClaim {
    id: usize,
    claim: String,
    code: String,
}

#[derive(Debug, Deserialize)]
struct JudgeVerdict {
    id: usize,
    supported: bool,
    #[serde(default)]
    reason: String,
}

pub struct BatchedJudge<'a> {
    model: &'a dyn ILanguageModel,
    batch_size: usize,
    pending: Vec<PendingClaim>,
    verdicts: Vec<CitationVerdict>,
    calls: usize,
}

impl<'a> BatchedJudge<'a> {
    pub fn new(model: &'a dyn ILanguageModel, batch_size: usize) -> Self {
        Self {
            model,
            batch_size: batch_size.max(1),
            pending: Vec::new(),
            verdicts: Vec::new(),
            calls: 0,
        }
    }

    /// Queue a claim; a full queue is judged immediately.
    pub fn submit(&mut self, citation_id: usize, claim: &str, span: &str) {
        let code = match span.char_indices().nth(MAX_SPAN_CHARS) {
            Some((cut, _)) => format!("{}\n...", &span[..cut]),
            None => span.to_string(),
        };
        self.pending.push(PendingClaim {
            id: citation_id,
            claim: claim.to_string(),
            code,
        });
        if self.pending.len() >= self.batch_size {
            self.flush();
        }
    }

    /// Judge whatever is queued.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.pending);
        self.calls += 1;
        let verdicts = self.judge_batch(&batch);
        self.verdicts.extend(verdicts);
    }

    /// Flush the remainder and return every verdict, ordered by citation.
    pub fn finish(mut self) -> (Vec<CitationVerdict>, usize) {
        self.flush();
        self.verdicts.sort_by_key(|v| v.citation_id);
        (self.verdicts, self.calls)
    }

    fn judge_batch(&self, batch: &[PendingClaim]) -> Vec<CitationVerdict> {
        let payload = match serde_json::to_string_pretty(batch) {
            Ok(p) => p,
            Err(e) => return unverifiable_all(batch, &format!("judge prompt: {e}")),
        };
        let request = ChatRequest::new(vec![
            ChatMessage::system(JUDGE_SYSTEM_PROMPT),
            ChatMessage::user(format!("Items:\n{payload}")),
        ]);
        let response = match self.model.complete(&request) {
            Ok(r) => r,
            Err(e) => {
                warn!(claims = batch.len(), error = %e, "judge call failed");
                return unverifiable_all(batch, &format!("judge unavailable: {e}"));
            }
        };
        let parsed: Vec<JudgeVerdict> = match extract_json_array(response.text_or_empty())
            .map(serde_json::from_str::<Vec<JudgeVerdict>>)
        {
            Some(Ok(v)) => v,
            Some(Err(e)) => return unverifiable_all(batch, &format!("unparseable judge reply: {e}")),
            None => return unverifiable_all(batch, "judge reply held no JSON array"),
        };
        debug!(claims = batch.len(), verdicts = parsed.len(), "judge batch complete");

        batch
            .iter()
            .map(|item| match parsed.iter().find(|v| v.id == item.id) {
                Some(v) if v.supported => {
                    CitationVerdict::valid(item.id, ClaimType::Abstractive, v.reason.clone())
                }
                Some(v) => CitationVerdict::invalid(
                    item.id,
                    ClaimType::Abstractive,
                    Severity::Major,
                    if v.reason.is_empty() {
                        "judge found the claim unsupported".to_string()
                    } else {
                        v.reason.clone()
                    },
                ),
                None => CitationVerdict::unverifiable(item.id, "judge returned no verdict"),
            })
            .collect()
    }
}

fn unverifiable_all(batch: &[PendingClaim], reason: &str) -> Vec<CitationVerdict> {
    batch
        .iter()
        .map(|item| CitationVerdict::unverifiable(item.id, reason))
        .collect()
}
