mod common;

tests!(unexpected_character in errors is ERR "[line 2:1] Error: unexpected character '@'");

tests!(invalid_assignment_target in errors is ERR "[line 1:3] Error at '=': invalid assignment target");

tests!(type_mismatch in errors is ERR "[line 1:9] Error at '+': operands must be two numbers or two strings");
