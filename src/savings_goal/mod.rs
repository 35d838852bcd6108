//! Savings goals: an amount the user wants to have saved by a deadline.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_savings_goal, create_savings_goal_table, delete_savings_goal, get_savings_goal,
    list_savings_goals, set_saved_amount, update_savings_goal,
};
pub use domain::{GoalId, NewSavingsGoal, SavedAmountForm, SavingsGoal, SavingsGoalForm};
pub use endpoints::{
    create_savings_goal_endpoint, delete_savings_goal_endpoint, edit_savings_goal_endpoint,
    list_savings_goals_endpoint, set_saved_amount_endpoint,
};
