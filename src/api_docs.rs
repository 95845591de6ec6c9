use utoipa::OpenApi;
use crate::controllers::forecast_controller;
use crate::models::forecast;

#[derive(OpenApi)]
#[openapi(
    paths(
        forecast_controller::get_health,
        forecast_controller::get_site,
        forecast_controller::get_forecast,
        forecast_controller::get_sun_times,
        forecast_controller::get_chart,
        forecast_controller::get_summary
    ),
    components(
        schemas(
            forecast::Location,
            forecast::PanelOrientation,
            forecast::ClearSkyParams,
            forecast::HourlyIrradiance,
            forecast::DailyForecast,
            forecast::SunTransition,
            forecast::SunTimes,
            forecast::SiteInfo,
            forecast::HealthStatus,
            forecast::ForecastResponse,
            forecast::ChartBar,
            forecast::ChartResponse
        )
    ),
    tags(
        (name = "solar-gain", description = "Clear-sky solar gain forecast API")
    )
)]
pub struct ApiDoc;
