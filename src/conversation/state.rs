/// Where a user currently is in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    MainMenu,
    AddName,
    AddSets,
    AddReps,
    AddWeight,
    Confirm,
    HistoryList,
    HistoryDetail {
        workout_id: String,
    },
}

impl State {
    /// True while the user is entering an exercise.
    pub fn is_data_entry(&self) -> bool {
        matches!(
            self,
            State::AddName | State::AddSets | State::AddReps | State::AddWeight | State::Confirm
        )
    }
}
