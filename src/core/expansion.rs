use crate::error::DataError;
use crate::models::{Respondent, RespondentGroup, CLONE_QUESTION};

const CLEARED: &str = "false";

/// Duplicate every respondent flagged on `flag_question` into a virtual clone.
///
/// Flagged rows are collected first, then clones are appended after all
/// originals, so existing row indices never move. The flag is cleared on both
/// the original and its clone, which makes a second expansion a no-op. Every
/// member of the returned group answers the reserved `is_clone` question.
pub fn expand_capacity(
    group: RespondentGroup,
    flag_question: &str,
) -> Result<RespondentGroup, DataError> {
    let mut respondents = group.into_inner();

    let mut flagged = Vec::new();
    for (row, respondent) in respondents.iter().enumerate() {
        if respondent.flag(flag_question)? {
            flagged.push(row);
        }
    }

    respondents.iter_mut().for_each(mark_original);

    for row in flagged {
        let original = &mut respondents[row];
        original.set_answer(flag_question, CLEARED);

        let mut clone = original.clone();
        clone.set_answer(CLONE_QUESTION, "true");
        clone.mark_clone_of(row);
        respondents.push(clone);
    }

    Ok(RespondentGroup::new(respondents))
}

/// Answer the reserved `is_clone` question on a group that is not expanded.
pub fn mark_originals(group: RespondentGroup) -> RespondentGroup {
    let mut respondents = group.into_inner();
    respondents.iter_mut().for_each(mark_original);
    RespondentGroup::new(respondents)
}

fn mark_original(respondent: &mut Respondent) {
    if respondent.get(CLONE_QUESTION).is_none() {
        respondent.set_answer(CLONE_QUESTION, CLEARED);
    }
}
