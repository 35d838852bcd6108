//! Raises alerts for budgets that are close to or over their limit.

use rusqlite::Connection;

use crate::{
    Error,
    auth::UserID,
    budget::{calculate_spending, list_notifying_budgets},
    budget_alert::{AlertType, NewAlert, insert_alert_if_none_open},
    transaction::sum_expenses,
};

/// Check each of the user's active budgets with notifications turned on and
/// raise an alert for any that are almost exceeded, at their limit or exceeded.
///
/// Spending is measured over each budget's own dates. A budget that already
/// has an unread alert of the same type does not get another one.
/// Existing alerts are never changed.
///
/// Returns the number of alerts raised.
pub fn check_budget_alerts(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    let budgets = list_notifying_budgets(user_id, connection)?;
    let mut created = 0;

    for budget in budgets {
        let current_spent = sum_expenses(user_id, budget.category_id, budget.window(), connection)?;

        let Some(spending) = calculate_spending(&budget, None, current_spent) else {
            continue;
        };

        let Some(alert_type) = AlertType::for_status(spending.status) else {
            continue;
        };

        let alert = NewAlert::for_budget(&budget, alert_type, &spending);

        if insert_alert_if_none_open(user_id, &alert, connection)? {
            tracing::info!(
                "raised {alert_type} alert for budget {} of user {user_id}",
                budget.id
            );
            created += 1;
        }
    }

    Ok(created)
}

#[cfg(test)]
mod alert_engine_tests {
    use time::macros::date;

    use crate::{
        budget::{BudgetForm, NewBudget, create_budget, delete_budget, update_budget},
        budget_alert::{AlertType, list_alerts, mark_alert_read},
        test_utils::{create_test_budget, create_test_expense, create_test_user, get_test_connection},
    };

    use super::check_budget_alerts;

    #[test]
    fn on_track_budget_raises_nothing() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        create_test_expense(&connection, user_id, budget.category_id, date!(2024 - 01 - 10), 50.0);

        assert_eq!(check_budget_alerts(user_id, &connection), Ok(0));
    }

    #[test]
    fn exceeded_budget_raises_alert_with_snapshot() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        create_test_expense(&connection, user_id, budget.category_id, date!(2024 - 01 - 10), 120.0);

        assert_eq!(check_budget_alerts(user_id, &connection), Ok(1));

        let alerts = list_alerts(user_id, &connection).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::BudgetExceeded);
        assert_eq!(
            alerts[0].message,
            format!(
                "Budget \"{}\" has been exceeded! Spent 120 out of 100",
                budget.name
            )
        );
        assert_eq!(alerts[0].current_spent, 120.0);
        assert_eq!(alerts[0].budget_amount, 100.0);
        assert!((alerts[0].percentage - 120.0).abs() < 1e-9);
        assert!(!alerts[0].is_read);
    }

    #[test]
    fn second_check_without_new_expenses_raises_nothing() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        create_test_expense(&connection, user_id, budget.category_id, date!(2024 - 01 - 10), 85.0);

        assert_eq!(check_budget_alerts(user_id, &connection), Ok(1));
        assert_eq!(check_budget_alerts(user_id, &connection), Ok(0));
        assert_eq!(list_alerts(user_id, &connection).unwrap().len(), 1);
    }

    #[test]
    fn read_alert_is_raised_again() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        create_test_expense(&connection, user_id, budget.category_id, date!(2024 - 01 - 10), 100.0);
        check_budget_alerts(user_id, &connection).unwrap();
        let alert = list_alerts(user_id, &connection).unwrap().remove(0);
        assert_eq!(alert.alert_type, AlertType::BudgetLimitReached);

        mark_alert_read(user_id, alert.id, &connection).unwrap();

        assert_eq!(check_budget_alerts(user_id, &connection), Ok(1));
        let alerts = list_alerts(user_id, &connection).unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts.iter().filter(|alert| !alert.is_read).count(), 1);
    }

    #[test]
    fn escalating_spending_raises_each_type_once() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        create_test_expense(&connection, user_id, budget.category_id, date!(2024 - 01 - 10), 85.0);
        check_budget_alerts(user_id, &connection).unwrap();

        create_test_expense(&connection, user_id, budget.category_id, date!(2024 - 01 - 11), 35.0);

        assert_eq!(check_budget_alerts(user_id, &connection), Ok(1));
        let alerts = list_alerts(user_id, &connection).unwrap();
        let mut types: Vec<AlertType> = alerts.iter().map(|alert| alert.alert_type).collect();
        types.sort_by_key(|alert_type| alert_type.as_str());
        assert_eq!(
            types,
            vec![AlertType::BudgetAlmostExceeded, AlertType::BudgetExceeded]
        );
    }

    #[test]
    fn budgets_without_notifications_or_inactive_are_skipped() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        create_test_expense(&connection, user_id, budget.category_id, date!(2024 - 01 - 10), 500.0);
        update_budget(
            user_id,
            budget.id,
            NewBudget {
                notifications: false,
                ..NewBudget::from_budget(&budget)
            },
            &connection,
        )
        .unwrap();
        create_budget(
            user_id,
            BudgetForm {
                name: Some("Old food".to_owned()),
                amount: Some(10.0),
                category_id: Some(budget.category_id),
                start_date: Some(budget.start_date),
                end_date: Some(budget.end_date),
                is_active: Some(false),
                ..Default::default()
            }
            .into_new_budget()
            .unwrap(),
            &connection,
        )
        .unwrap();

        assert_eq!(check_budget_alerts(user_id, &connection), Ok(0));
    }

    #[test]
    fn deleted_budget_takes_its_alerts() {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "ada");
        let budget = create_test_budget(&connection, user_id, 100.0);
        create_test_expense(&connection, user_id, budget.category_id, date!(2024 - 01 - 10), 120.0);
        check_budget_alerts(user_id, &connection).unwrap();

        delete_budget(user_id, budget.id, &connection).unwrap();

        assert!(list_alerts(user_id, &connection).unwrap().is_empty());
    }
}
