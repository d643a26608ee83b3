use wayfare_core::booking::BookingWithRelations;
use wayfare_core::notify::IssuedCredentials;
use wayfare_core::request::PackageRequest;

pub(crate) fn booking_confirmation(
    booking: &BookingWithRelations,
    credentials: Option<&IssuedCredentials>,
    frontend_url: &str,
) -> String {
    let start_date = booking
        .start_date
        .map(|d| format!("<p><strong>Start Date:</strong> {}</p>", d.format("%B %-d, %Y")))
        .unwrap_or_default();
    let total_amount = booking
        .total_amount
        .map(|a| format!("<p><strong>Total Amount:</strong> {a:.2}</p>"))
        .unwrap_or_default();

    let credentials_block = credentials
        .map(|c| {
            format!(
                r#"
        <div style="background: #fff3cd; padding: 15px; margin: 15px 0; border: 1px solid #ffc107;">
            <h3>Your Account Credentials</h3>
            <p>We've created an account for you to manage your bookings:</p>
            <p><strong>Email:</strong> {email}</p>
            <p><strong>Password:</strong> {password}</p>
            <p style="color: #d9534f;"><strong>Important:</strong> Please change your password after first login.</p>
            <p><a href="{frontend_url}/login"
                  style="display: inline-block; padding: 10px 20px; background: #007bff; color: white; text-decoration: none; border-radius: 4px;">
                Login to Your Account
            </a></p>
        </div>
"#,
                email = c.email,
                password = c.password,
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <div style="background: #007bff; color: white; padding: 20px; text-align: center;">
            <h1>Booking Confirmed</h1>
        </div>
        <div style="padding: 20px; background: #f9f9f9;">
            <h2>Dear {traveler_name},</h2>
            <p>Your booking has been confirmed. We look forward to hosting your trip.</p>
            <div style="background: white; padding: 15px; margin: 15px 0; border-left: 4px solid #007bff;">
                <h3>Booking Details</h3>
                <p><strong>Package:</strong> {package_title}</p>
                <p><strong>Duration:</strong> {package_days} days</p>
                <p><strong>Number of Travelers:</strong> {no_of_travelers}</p>
                {start_date}
                {total_amount}
                <p><strong>Booking ID:</strong> {booking_id}</p>
            </div>
            {credentials_block}
            <p>If you have any questions, please don't hesitate to contact us.</p>
        </div>
    </div>
</body>
</html>
"#,
        traveler_name = booking.traveler_name,
        package_title = booking.package_title,
        package_days = booking.package_days,
        no_of_travelers = booking.no_of_travelers,
        booking_id = booking.booking_id,
    )
}

pub(crate) fn request_acknowledgment(request: &PackageRequest) -> String {
    let budget = request
        .budget_range
        .as_deref()
        .map(|b| format!("<p><strong>Budget:</strong> {b}</p>"))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <div style="background: #17a2b8; color: white; padding: 20px; text-align: center;">
            <h1>Request Received</h1>
        </div>
        <div style="padding: 20px; background: #f9f9f9;">
            <h2>Dear {traveler_name},</h2>
            <p>Thank you for your custom package request. We have received your requirements and will review them shortly.</p>
            <div style="background: white; padding: 15px; margin: 15px 0; border-left: 4px solid #17a2b8;">
                <h3>Your Request</h3>
                <p><strong>Title:</strong> {title}</p>
                <p><strong>Duration:</strong> {no_of_days} days</p>
                <p><strong>Travelers:</strong> {no_of_travelers}</p>
                {budget}
            </div>
            <p>Our team will contact you within 24-48 hours with a customized package based on your requirements.</p>
        </div>
    </div>
</body>
</html>
"#,
        traveler_name = request.traveler_name,
        title = request.title,
        no_of_days = request.no_of_days,
        no_of_travelers = request.no_of_travelers,
    )
}

pub(crate) fn password_change_notice(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <div style="background: #28a745; color: white; padding: 20px; text-align: center;">
            <h1>Password Changed</h1>
        </div>
        <div style="padding: 20px; background: #f9f9f9;">
            <h2>Dear {name},</h2>
            <p>Your password has been changed successfully.</p>
            <p>If you did not make this change, please contact us immediately.</p>
        </div>
    </div>
</body>
</html>
"#
    )
}
