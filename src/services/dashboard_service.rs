// src/services/dashboard_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, formatting::format_currency},
    db::DashboardRepository,
    models::dashboard::{DashboardCounts, DashboardSummary, SalesChartEntry},
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary(&self, user_id: Uuid) -> Result<DashboardSummary, AppError> {
        let counts = self.repo.get_counts(user_id).await?;
        Ok(summarize(counts))
    }

    pub async fn get_sales_chart(&self, user_id: Uuid) -> Result<Vec<SalesChartEntry>, AppError> {
        self.repo.get_sales_last_30_days(user_id).await
    }
}

fn summarize(c: DashboardCounts) -> DashboardSummary {
    let open_leads = c.new_leads + c.contacted_leads + c.interested_leads + c.negotiating_leads;

    // Ticket médio: zero quando ainda não há vendas
    let average_ticket = if c.total_sales > 0 {
        (c.revenue / Decimal::from(c.total_sales)).round_dp(2)
    } else {
        Decimal::ZERO
    };

    DashboardSummary {
        total_vehicles: c.available_vehicles + c.reserved_vehicles + c.sold_vehicles,
        available_vehicles: c.available_vehicles,
        reserved_vehicles: c.reserved_vehicles,
        sold_vehicles: c.sold_vehicles,
        total_leads: open_leads + c.closed_leads + c.lost_leads,
        open_leads,
        closed_leads: c.closed_leads,
        lost_leads: c.lost_leads,
        total_sales: c.total_sales,
        revenue_formatted: format_currency(c.revenue),
        average_ticket_formatted: format_currency(average_ticket),
        revenue: c.revenue,
        average_ticket,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_adds_up_counts() {
        let counts = DashboardCounts {
            available_vehicles: 4,
            reserved_vehicles: 1,
            sold_vehicles: 3,
            new_leads: 2,
            contacted_leads: 1,
            negotiating_leads: 1,
            closed_leads: 3,
            lost_leads: 2,
            total_sales: 3,
            revenue: Decimal::new(100_000, 0),
            ..Default::default()
        };

        let summary = summarize(counts);

        assert_eq!(summary.total_vehicles, 8);
        assert_eq!(summary.open_leads, 4);
        assert_eq!(summary.total_leads, 9);
        assert_eq!(summary.average_ticket, Decimal::new(3_333_333, 2));
        assert_eq!(summary.revenue_formatted, "R$ 100.000,00");
        assert_eq!(summary.average_ticket_formatted, "R$ 33.333,33");
    }

    #[test]
    fn no_sales_means_zero_ticket() {
        let summary = summarize(DashboardCounts::default());
        assert_eq!(summary.average_ticket, Decimal::ZERO);
        assert_eq!(summary.revenue, Decimal::ZERO);
    }
}
